use std::{fmt, str::FromStr};

const MAX_ROOM_ID_LEN: usize = 32;

/// Caller-chosen room identifier: 1-32 ascii letters, digits, `-` or `_`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > MAX_ROOM_ID_LEN {
            return Err(format!("room id must be 1-{} characters", MAX_ROOM_ID_LEN));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err("room id may only contain letters, digits, '-' and '_'".to_string());
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<&str> for RoomId {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
