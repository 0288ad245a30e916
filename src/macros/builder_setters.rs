/// Generates by-value setters for an options table, forwarding each field's doc comment.
macro_rules! builder_setters {
    ($($(#[doc = $doc:expr])+ $name:ident : $ty:ty),+ $(,)?) => {$(
        $(#[doc = $doc])+
        #[must_use = "builder setters take the entire structure and return the result"]
        #[inline(always)]
        pub fn $name(mut self, $name: $ty) -> Self {
            self.$name = $name;
            self
        }
    )+};
}
