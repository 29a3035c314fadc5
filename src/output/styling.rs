use console::{style, StyledObject};

pub fn success(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).green().bright()
}

pub fn failure(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).red().bright()
}

pub fn pending(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).yellow().bright()
}

pub fn muted(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn title(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
