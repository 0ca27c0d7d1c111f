use std::marker::PhantomData;

/// The markup syntax configuration.
///
/// Use [`Syntax::default()`] to get the default delimiters and
/// [`Syntax::builder()`] to choose your own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax<'a> {
    pub(crate) patterns: Vec<(Kind, String)>,
    _marker: PhantomData<&'a ()>,
}

/// A builder for the syntax configuration.
///
/// This struct is typically created using [`Syntax::builder()`].
#[derive(Debug, Clone)]
pub struct SyntaxBuilder<'a> {
    expr: Option<(&'a str, &'a str)>,
    block: Option<(&'a str, &'a str)>,
    comment: Option<(&'a str, &'a str)>,
}

/// The kind of delimiter a pattern represents.
///
/// The trimming variants are generated from the plain delimiters by adding a
/// `-` on the inner side, e.g. `{%-` and `-%}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    BeginExpr,
    EndExpr,
    BeginExprTrim,
    EndExprTrim,
    BeginBlock,
    EndBlock,
    BeginBlockTrim,
    EndBlockTrim,
    BeginComment,
    EndComment,
    BeginCommentTrim,
    EndCommentTrim,
}

impl Default for Syntax<'_> {
    /// Returns the default syntax configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use slotted::Syntax;
    ///
    /// let syntax = Syntax::builder()
    ///     .expr("{{", "}}")
    ///     .block("{%", "%}")
    ///     .comment("{#", "#}")
    ///     .build();
    /// assert_eq!(syntax, Syntax::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Syntax::builder()
            .expr("{{", "}}")
            .block("{%", "%}")
            .comment("{#", "#}")
            .build()
    }
}

impl<'a> Syntax<'a> {
    /// Create a new syntax builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let syntax = slotted::Syntax::builder()
    ///     .expr("<{", "}>")
    ///     .block("<[", "]>")
    ///     .build();
    /// ```
    #[inline]
    pub fn builder() -> SyntaxBuilder<'a> {
        SyntaxBuilder::new()
    }
}

impl<'a> SyntaxBuilder<'a> {
    /// Creates a new syntax builder.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            expr: None,
            block: None,
            comment: None,
        }
    }

    /// Set the expression syntax, used to emit properties and slots.
    ///
    /// If not set then expressions will not be available.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn expr(&mut self, begin_expr: &'a str, end_expr: &'a str) -> &mut Self {
        assert!(!begin_expr.is_empty() && !end_expr.is_empty());
        self.expr = Some((begin_expr, end_expr));
        self
    }

    /// Set the block syntax, used for component and slot tags.
    ///
    /// If not set then components can only be driven through the
    /// [`Context`][crate::Context] API.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn block(&mut self, begin_block: &'a str, end_block: &'a str) -> &mut Self {
        assert!(!begin_block.is_empty() && !end_block.is_empty());
        self.block = Some((begin_block, end_block));
        self
    }

    /// Set the comment syntax.
    ///
    /// If not set then comments will not be available.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn comment(&mut self, begin_comment: &'a str, end_comment: &'a str) -> &mut Self {
        assert!(!begin_comment.is_empty() && !end_comment.is_empty());
        self.comment = Some((begin_comment, end_comment));
        self
    }

    /// Builds the syntax configuration.
    pub fn build(&self) -> Syntax<'a> {
        let mut patterns = Vec::new();
        let mut push = |(begin, end): (&str, &str), kinds: [Kind; 4]| {
            let [b, e, bt, et] = kinds;
            patterns.push((b, begin.to_owned()));
            patterns.push((e, end.to_owned()));
            patterns.push((bt, format!("{begin}-")));
            patterns.push((et, format!("-{end}")));
        };
        if let Some(pair) = self.expr {
            push(
                pair,
                [
                    Kind::BeginExpr,
                    Kind::EndExpr,
                    Kind::BeginExprTrim,
                    Kind::EndExprTrim,
                ],
            );
        }
        if let Some(pair) = self.block {
            push(
                pair,
                [
                    Kind::BeginBlock,
                    Kind::EndBlock,
                    Kind::BeginBlockTrim,
                    Kind::EndBlockTrim,
                ],
            );
        }
        if let Some(pair) = self.comment {
            push(
                pair,
                [
                    Kind::BeginComment,
                    Kind::EndComment,
                    Kind::BeginCommentTrim,
                    Kind::EndCommentTrim,
                ],
            );
        }
        Syntax {
            patterns,
            _marker: PhantomData,
        }
    }
}
