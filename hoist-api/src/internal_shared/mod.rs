mod misc;
#[allow(unused_imports)]
pub(crate) use misc::*;
