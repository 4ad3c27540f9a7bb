//! Text functions

use crate::ast::Node;

/// CONCATENATE(text1; [text2]; ...)
///
/// Every argument must have a text form; numbers and booleans are joined
/// as they render.
pub fn fn_concatenate(args: &[Node]) -> Node {
    let mut result = String::new();
    for arg in args {
        match arg.stringify() {
            Some(s) => result.push_str(&s),
            None => return Node::Error,
        }
    }
    Node::String(result)
}
