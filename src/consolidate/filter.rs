use anyhow::{Context, Result};
use regex::Regex;

const MIN_KEYWORD_CHARS: usize = 3;
const MAX_KEYWORD_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    LowVolume,
    InformationalJunk,
    Length,
}

pub struct InitialFilter {
    min_volume: u64,
    junk_prefix: Regex,
}

impl InitialFilter {
    pub fn new(min_volume: u64) -> Result<Self> {
        let junk_prefix = Regex::new(r"^(?:how to make|how to create|how to build|diy|tutorial)")
            .context("failed to compile informational junk regex")?;
        Ok(Self {
            min_volume,
            junk_prefix,
        })
    }

    pub fn check(&self, keyword: &str, volume: u64) -> Option<Rejection> {
        if volume < self.min_volume {
            return Some(Rejection::LowVolume);
        }

        if self.junk_prefix.is_match(keyword) {
            return Some(Rejection::InformationalJunk);
        }

        let length = keyword.chars().count();
        if !(MIN_KEYWORD_CHARS..=MAX_KEYWORD_CHARS).contains(&length) {
            return Some(Rejection::Length);
        }

        None
    }
}
