#![allow(unused_macros)]

macro_rules! make_macro_modules {
    ($($modname:ident),+ $(,)?) => {$(
        #[macro_use] mod $modname;
    )+};
}

make_macro_modules! {
    builder_setters,
}
