use crate::{ParseNode, SuccessData};

impl SuccessData {
    pub fn new(consumed_index: usize, tree: ParseNode) -> Self {
        Self {
            consumed_index,
            tree,
        }
    }
}
