use crate::constants::{AUTH, THEME};
use bitflags::bitflags;
use std::fmt::Debug;

bitflags! {
    /// The set of feature slices compiled into a build, in binding order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FeatureSet: u32 {
        const THEME = 1 << 0;
        const AUTH = 1 << 1;

        const ALL = Self::THEME.bits() | Self::AUTH.bits();
    }
}

impl From<&str> for FeatureSet {
    fn from(s: &str) -> Self {
        match s {
            THEME => Self::THEME,
            AUTH => Self::AUTH,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}
