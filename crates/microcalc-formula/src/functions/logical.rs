//! Logical functions

use crate::ast::Node;

/// IF(condition; value_if_true; value_if_false)
///
/// Both branches arrive already evaluated; the condition only picks one.
pub fn fn_if(args: &[Node]) -> Node {
    let [condition, if_true, if_false] = args else {
        return Node::Error;
    };

    match condition.boolify() {
        Some(true) => if_true.clone(),
        Some(false) => if_false.clone(),
        None => Node::Error,
    }
}
