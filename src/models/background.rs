use std::str::FromStr;

use tiny_skia::Color;

use crate::error::ParseColorError;

/// Canvas background behind the resized image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Background {
    /// Leave the canvas as allocated (fully transparent)
    #[default]
    Transparent,
    /// Fill the whole canvas before drawing
    Color(Color),
}

impl Background {
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Background::Color(Color::from_rgba8(r, g, b, a))
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Background::Transparent)
    }

    /// Colour to fill with, if any.
    pub fn fill_color(&self) -> Option<Color> {
        match self {
            Background::Transparent => None,
            Background::Color(color) => Some(*color),
        }
    }
}

impl From<Color> for Background {
    fn from(color: Color) -> Self {
        Background::Color(color)
    }
}

impl FromStr for Background {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();

        if value.is_empty() || value == "transparent" {
            return Ok(Background::Transparent);
        }

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ParseColorError::InvalidHex(s.to_string()));
        }

        if let Some(args) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
        {
            let has_alpha = value.starts_with("rgba(");
            return parse_function(args, has_alpha)
                .ok_or_else(|| ParseColorError::InvalidFunction(s.to_string()));
        }

        let (r, g, b) = match value.as_str() {
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "blue" => (0, 0, 255),
            "gray" | "grey" => (128, 128, 128),
            _ => return Err(ParseColorError::UnknownName(s.to_string())),
        };
        Ok(Background::rgba(r, g, b, 255))
    }
}

fn parse_hex(hex: &str) -> Option<Background> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    Some(Background::rgba(r, g, b, a))
}

fn parse_function(args: &str, has_alpha: bool) -> Option<Background> {
    let args = args.strip_suffix(')')?;
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();

    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |part: &str| -> Option<u8> {
        let value: f32 = part.parse().ok()?;
        if !(0.0..=255.0).contains(&value) {
            return None;
        }
        Some(value.round() as u8)
    };

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if has_alpha {
        let alpha: f32 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        (alpha * 255.0).round() as u8
    } else {
        255
    };

    Some(Background::rgba(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(background: Background) -> (u8, u8, u8, u8) {
        let color = background.fill_color().unwrap().to_color_u8();
        (color.red(), color.green(), color.blue(), color.alpha())
    }

    #[test]
    fn test_transparent_tokens() {
        assert_eq!("transparent".parse::<Background>(), Ok(Background::Transparent));
        assert_eq!("".parse::<Background>(), Ok(Background::Transparent));
        assert_eq!("  Transparent ".parse::<Background>(), Ok(Background::Transparent));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(rgba8("#fff".parse().unwrap()), (255, 255, 255, 255));
        assert_eq!(rgba8("#f008".parse().unwrap()), (255, 0, 0, 136));
        assert_eq!(rgba8("#336699".parse().unwrap()), (0x33, 0x66, 0x99, 255));
        assert_eq!(rgba8("#33669980".parse().unwrap()), (0x33, 0x66, 0x99, 0x80));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(
            "#12345".parse::<Background>(),
            Err(ParseColorError::InvalidHex(_))
        ));
        assert!(matches!(
            "#zzz".parse::<Background>(),
            Err(ParseColorError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(rgba8("rgb(10, 20, 30)".parse().unwrap()), (10, 20, 30, 255));
        assert_eq!(rgba8("rgba(10,20,30,0.5)".parse().unwrap()), (10, 20, 30, 128));
        assert!(matches!(
            "rgb(10, 20)".parse::<Background>(),
            Err(ParseColorError::InvalidFunction(_))
        ));
        assert!(matches!(
            "rgba(10, 20, 30, 2)".parse::<Background>(),
            Err(ParseColorError::InvalidFunction(_))
        ));
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(rgba8("white".parse().unwrap()), (255, 255, 255, 255));
        assert_eq!(rgba8("GREY".parse().unwrap()), rgba8("gray".parse().unwrap()));
        assert!(matches!(
            "chartreuse".parse::<Background>(),
            Err(ParseColorError::UnknownName(_))
        ));
    }
}
