pub(crate) mod fragment;
pub(crate) mod renderer;
pub(crate) mod scripted;
