use crate::TextureDecodeError;

type Result<T> = std::result::Result<T, TextureDecodeError>;

/// Pixel formats used by CMAB textures.
///
/// The discriminants are the combined GL format/type codes written into the
/// archive by the PICA200 toolchain. They are a wire-format contract, so they
/// must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TextureFormat {
    ETC1 = 0x0000675A,
    ETC1A4 = 0x0000675B,
    RGBA8 = 0x14016752,
    RGB8 = 0x14016754,
    A8 = 0x14016756,
    L8 = 0x14016757,
    LA8 = 0x14016758,
    L4 = 0x67616757,
    LA4 = 0x67606758,
    RGBA4 = 0x80336752,
    RGBA5551 = 0x80346752,
    RGB565 = 0x83636754,
}

impl TextureFormat {
    /// Resolves a raw format code from a texture entry. Unknown codes are a
    /// hard failure; guessing a format would produce plausible-looking but
    /// wrong pixels.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0x0000675A => Ok(TextureFormat::ETC1),
            0x0000675B => Ok(TextureFormat::ETC1A4),
            0x14016752 => Ok(TextureFormat::RGBA8),
            0x14016754 => Ok(TextureFormat::RGB8),
            0x14016756 => Ok(TextureFormat::A8),
            0x14016757 => Ok(TextureFormat::L8),
            0x14016758 => Ok(TextureFormat::LA8),
            0x67616757 => Ok(TextureFormat::L4),
            0x67606758 => Ok(TextureFormat::LA4),
            0x80336752 => Ok(TextureFormat::RGBA4),
            0x80346752 => Ok(TextureFormat::RGBA5551),
            0x83636754 => Ok(TextureFormat::RGB565),
            _ => Err(TextureDecodeError::UnsupportedFormat(code)),
        }
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn bits_per_pixel(&self) -> usize {
        match self {
            TextureFormat::ETC1 => 4,
            TextureFormat::ETC1A4 => 8,
            TextureFormat::RGBA8 => 32,
            TextureFormat::RGB8 => 24,
            TextureFormat::A8 => 8,
            TextureFormat::L8 => 8,
            TextureFormat::LA8 => 16,
            TextureFormat::L4 => 4,
            TextureFormat::LA4 => 8,
            TextureFormat::RGBA4 => 16,
            TextureFormat::RGBA5551 => 16,
            TextureFormat::RGB565 => 16,
        }
    }

    /// Width of the square tile the hardware swizzles pixels within. ETC1
    /// textures are stored as 4x4 compressed blocks, everything else as 8x8
    /// tiles. Texture dimensions must be multiples of this.
    pub fn tile_size(&self) -> usize {
        match self {
            TextureFormat::ETC1 | TextureFormat::ETC1A4 => 4,
            _ => 8,
        }
    }

    /// Byte length of the raw texel payload for the given dimensions.
    pub fn data_len(&self, width: usize, height: usize) -> usize {
        width * height * self.bits_per_pixel() / 8
    }
}

#[cfg(test)]
mod test {
    use super::TextureFormat;
    use crate::TextureDecodeError;

    #[test]
    fn from_code_resolves_known_formats() {
        let result = TextureFormat::from_code(0x0000675A);
        assert!(result.is_ok());
        assert_eq!(TextureFormat::ETC1, result.unwrap());
        let result = TextureFormat::from_code(0x83636754);
        assert!(result.is_ok());
        assert_eq!(TextureFormat::RGB565, result.unwrap());
        let result = TextureFormat::from_code(0x67606758);
        assert!(result.is_ok());
        assert_eq!(TextureFormat::LA4, result.unwrap());
    }

    #[test]
    fn from_code_rejects_unknown_code() {
        let result = TextureFormat::from_code(0xDEADBEEF);
        assert!(matches!(
            result,
            Err(TextureDecodeError::UnsupportedFormat(0xDEADBEEF))
        ));
    }

    #[test]
    fn code_round_trips() {
        let formats = [
            TextureFormat::ETC1,
            TextureFormat::ETC1A4,
            TextureFormat::RGBA8,
            TextureFormat::RGB8,
            TextureFormat::A8,
            TextureFormat::L8,
            TextureFormat::LA8,
            TextureFormat::L4,
            TextureFormat::LA4,
            TextureFormat::RGBA4,
            TextureFormat::RGBA5551,
            TextureFormat::RGB565,
        ];
        for format in &formats {
            assert_eq!(*format, TextureFormat::from_code(format.code()).unwrap());
        }
    }

    #[test]
    fn data_len_matches_format_density() {
        assert_eq!(256, TextureFormat::RGBA8.data_len(8, 8));
        assert_eq!(192, TextureFormat::RGB8.data_len(8, 8));
        assert_eq!(32, TextureFormat::L4.data_len(8, 8));
        assert_eq!(8, TextureFormat::ETC1.data_len(4, 4));
        assert_eq!(16, TextureFormat::ETC1A4.data_len(4, 4));
    }
}
