pub mod markup;
pub mod span;
pub mod syntax;
