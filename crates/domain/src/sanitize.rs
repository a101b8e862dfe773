//! 消息正文净化。

/// 把用户输入里的标记字符替换为对应的命名转义，
/// 其余字节原样通过。纯函数，永不失败。
pub fn sanitize(text: &str) -> String {
    text.replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
