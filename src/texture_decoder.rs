use crate::texture_format::TextureFormat;
use crate::{etc1, TextureDecodeError};

type Result<T> = std::result::Result<T, TextureDecodeError>;

/// Traversal order of the 64 texels inside an 8x8 tile as they appear in the
/// byte stream. Values are `y * 8 + x` destination indices. This is a
/// hardware-defined constant, not something to derive.
#[rustfmt::skip]
const TILE_ORDER: [usize; 64] = [
     0,  1,  8,  9,  2,  3, 10, 11,
    16, 17, 24, 25, 18, 19, 26, 27,
     4,  5, 12, 13,  6,  7, 14, 15,
    20, 21, 28, 29, 22, 23, 30, 31,
    32, 33, 40, 41, 34, 35, 42, 43,
    48, 49, 56, 57, 50, 51, 58, 59,
    36, 37, 44, 45, 38, 39, 46, 47,
    52, 53, 60, 61, 54, 55, 62, 63,
];

/// Converts raw, swizzled texel data into a row-major RGBA8888 buffer of
/// `width * height * 4` bytes. Exactly the bytes the dimensions require are
/// consumed; trailing bytes (mip levels and the like) are ignored.
pub fn decode(data: &[u8], width: usize, height: usize, format: TextureFormat) -> Result<Vec<u8>> {
    let tile_size = format.tile_size();
    if width == 0 || height == 0 || width % tile_size != 0 || height % tile_size != 0 {
        return Err(TextureDecodeError::InvalidDimensions(width, height));
    }
    let expected = format.data_len(width, height);
    if data.len() < expected {
        return Err(TextureDecodeError::TruncatedPayload(expected, data.len()));
    }
    match format {
        TextureFormat::ETC1 => Ok(unscramble_etc1(data, width, height, false)),
        TextureFormat::ETC1A4 => Ok(unscramble_etc1(data, width, height, true)),
        _ => Ok(unpack_tiled(data, width, height, format)),
    }
}

/// Decompresses the ETC1 block stream and rearranges the blocks into
/// row-major grid order.
fn unscramble_etc1(data: &[u8], width: usize, height: usize, alpha: bool) -> Vec<u8> {
    let decoded = etc1::decompress(data, width, height, alpha);
    let scramble = etc1_scramble(width, height);
    let row_width = width / 4;
    let block_count = row_width * (height / 4);
    let mut output = vec![0; width * height * 4];
    let mut index = 0;
    for block_y in 0..height / 4 {
        for block_x in 0..width / 4 {
            let source = scramble[index];
            index += 1;
            if source < 0 || source as usize >= block_count {
                continue;
            }
            let source_x = source as usize % row_width;
            let source_y = source as usize / row_width;
            for y in 0..4 {
                for x in 0..4 {
                    let src = ((source_y * 4 + y) * width + source_x * 4 + x) * 4;
                    let dst = ((block_y * 4 + y) * width + block_x * 4 + x) * 4;
                    output[dst..dst + 4].copy_from_slice(&decoded[src..src + 4]);
                }
            }
        }
    }
    output
}

/// Source block index for each row-major destination block of an ETC1
/// texture. The hardware emits 4x4 blocks along a zig-zag walk of 2x2 super
/// blocks rather than in grid order; this reproduces that walk with the same
/// pair of alternating counters.
pub fn etc1_scramble(width: usize, height: usize) -> Vec<i32> {
    let row_width = (width / 4) as i32;
    let block_count = (width / 4) * (height / 4);
    let mut scramble = vec![0; block_count];
    let mut step_toggle = 0;
    let mut row_toggle = 0;
    let mut base = 0;
    let mut row_base = 0;
    for index in 0..block_count {
        if index > 0 && index as i32 % row_width == 0 {
            if row_toggle < 1 {
                row_toggle += 1;
                row_base += 2;
                base = row_base;
            } else {
                row_toggle = 0;
                base -= 2;
                row_base = base;
            }
        }
        scramble[index] = base;
        if step_toggle < 1 {
            step_toggle += 1;
            base += 1;
        } else {
            step_toggle = 0;
            base += 3;
        }
    }
    scramble
}

/// Unpacks an uncompressed format, one 8x8 tile at a time, consuming texels
/// in `TILE_ORDER`.
fn unpack_tiled(data: &[u8], width: usize, height: usize, format: TextureFormat) -> Vec<u8> {
    let mut output = vec![0; width * height * 4];
    let mut cursor = 0;
    let mut high_nibble = false;
    for tile_y in 0..height / 8 {
        for tile_x in 0..width / 8 {
            for &step in TILE_ORDER.iter() {
                let x = tile_x * 8 + step % 8;
                let y = tile_y * 8 + step / 8;
                let dst = (y * width + x) * 4;
                match format {
                    TextureFormat::RGBA8 => {
                        // Source byte order is A,B,G,R.
                        let r = data[cursor + 3];
                        let g = data[cursor + 2];
                        let b = data[cursor + 1];
                        output[dst..dst + 4].copy_from_slice(&[r, g, b, data[cursor]]);
                        cursor += 4;
                    }
                    TextureFormat::RGB8 => {
                        // Source byte order is B,G,R.
                        let r = data[cursor + 2];
                        let g = data[cursor + 1];
                        let b = data[cursor];
                        output[dst..dst + 4].copy_from_slice(&[r, g, b, 255]);
                        cursor += 3;
                    }
                    TextureFormat::A8 => {
                        output[dst..dst + 4].copy_from_slice(&[255, 255, 255, data[cursor]]);
                        cursor += 1;
                    }
                    TextureFormat::L8 => {
                        let l = data[cursor];
                        output[dst..dst + 4].copy_from_slice(&[l, l, l, 255]);
                        cursor += 1;
                    }
                    TextureFormat::LA8 => {
                        let l = data[cursor];
                        output[dst..dst + 4].copy_from_slice(&[l, l, l, data[cursor + 1]]);
                        cursor += 2;
                    }
                    TextureFormat::LA4 => {
                        // The nibbles are written raw, not replicated to 8
                        // bits like L4.
                        let l = data[cursor] >> 4;
                        let a = data[cursor] & 0xF;
                        output[dst..dst + 4].copy_from_slice(&[l, l, l, a]);
                        cursor += 1;
                    }
                    TextureFormat::L4 => {
                        let v = if high_nibble {
                            let v = data[cursor] >> 4;
                            cursor += 1;
                            v
                        } else {
                            data[cursor] & 0xF
                        };
                        high_nibble = !high_nibble;
                        let l = expand_4(v);
                        output[dst..dst + 4].copy_from_slice(&[l, l, l, 255]);
                    }
                    TextureFormat::RGBA4 => {
                        let word = u16::from_le_bytes([data[cursor], data[cursor + 1]]);
                        let r = expand_4((word >> 12 & 0xF) as u8);
                        let g = expand_4((word >> 8 & 0xF) as u8);
                        let b = expand_4((word >> 4 & 0xF) as u8);
                        let a = expand_4((word & 0xF) as u8);
                        output[dst..dst + 4].copy_from_slice(&[r, g, b, a]);
                        cursor += 2;
                    }
                    TextureFormat::RGBA5551 => {
                        let word = u16::from_le_bytes([data[cursor], data[cursor + 1]]);
                        let r = expand_5((word >> 11 & 0x1F) as u8);
                        let g = expand_5((word >> 6 & 0x1F) as u8);
                        let b = expand_5((word >> 1 & 0x1F) as u8);
                        let a = if word & 1 != 0 { 255 } else { 0 };
                        output[dst..dst + 4].copy_from_slice(&[r, g, b, a]);
                        cursor += 2;
                    }
                    TextureFormat::RGB565 => {
                        let word = u16::from_le_bytes([data[cursor], data[cursor + 1]]);
                        let r = expand_5((word >> 11 & 0x1F) as u8);
                        let g = expand_6((word >> 5 & 0x3F) as u8);
                        let b = expand_5((word & 0x1F) as u8);
                        output[dst..dst + 4].copy_from_slice(&[r, g, b, 255]);
                        cursor += 2;
                    }
                    TextureFormat::ETC1 | TextureFormat::ETC1A4 => {}
                }
            }
        }
    }
    output
}

fn expand_4(value: u8) -> u8 {
    value << 4 | value
}

fn expand_5(value: u8) -> u8 {
    value << 3 | value >> 2
}

fn expand_6(value: u8) -> u8 {
    value << 2 | value >> 4
}
