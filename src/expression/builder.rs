use crate::expression::{Lookahead, Not, OneOrMore, Optional, ZeroOrMore};
use crate::IExpression;
use std::rc::Rc;

/// A builder utility trait implemented for every sized expression, converting
/// it into the wrapper utilities without spelling out the `Rc` plumbing.
pub trait ExpressionBuilder: IExpression + Sized + 'static {
    fn into_optional(self) -> Optional {
        Optional::new(&(Rc::new(self) as Rc<dyn IExpression>))
    }

    fn into_zero_or_more(self) -> ZeroOrMore {
        ZeroOrMore::new(&(Rc::new(self) as Rc<dyn IExpression>))
    }

    fn into_one_or_more(self) -> OneOrMore {
        OneOrMore::new(&(Rc::new(self) as Rc<dyn IExpression>))
    }

    fn into_lookahead(self) -> Lookahead {
        Lookahead::new(&(Rc::new(self) as Rc<dyn IExpression>))
    }

    fn into_not(self) -> Not {
        Not::new(&(Rc::new(self) as Rc<dyn IExpression>))
    }
}

impl<T: IExpression + Sized + 'static> ExpressionBuilder for T {}
