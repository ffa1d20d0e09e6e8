//! ETC1/ETC1A4 block decompression as performed by the 3DS texture units.
//!
//! The console stores the 8 color bytes of each block in reversed order
//! relative to the standard ETC1 bit layout, and ETC1A4 prepends 8 bytes of
//! 4-bit alpha per block. Reversal is applied as a fixed pre-processing step
//! before standard ETC1 bit extraction.

/// Intensity modifier table. Rows are selected by the per-sub-block 3-bit
/// table index, columns by the per-texel 2-bit code.
const MODIFIER_TABLE: [[i32; 4]; 8] = [
    [2, 8, -2, -8],
    [5, 17, -5, -17],
    [9, 29, -9, -29],
    [13, 42, -13, -42],
    [18, 60, -18, -60],
    [24, 80, -24, -80],
    [33, 106, -33, -106],
    [47, 183, -47, -183],
];

/// Decompresses every block of `input` into a row-major RGBA image. Blocks
/// land at grid positions matching their order in the byte stream; callers
/// apply the block scramble on top of this.
pub fn decompress(input: &[u8], width: usize, height: usize, alpha: bool) -> Vec<u8> {
    let mut output = vec![0; width * height * 4];
    let mut offset = 0;
    for block_y in 0..height / 4 {
        for block_x in 0..width / 4 {
            let mut color_block = [0; 8];
            let mut alpha_block = [0xFF; 8];
            if alpha {
                for i in 0..8 {
                    color_block[7 - i] = input[offset + 8 + i];
                    alpha_block[i] = input[offset + i];
                }
                offset += 16;
            } else {
                for i in 0..8 {
                    color_block[7 - i] = input[offset + i];
                }
                offset += 8;
            }
            let tile = decode_block(&color_block);

            // Texels are visited column by column; alpha nibbles are consumed
            // in the same order, low nibble first.
            let mut nibble = 0;
            for x in 0..4 {
                for y in 0..4 {
                    let src = (y * 4 + x) * 3;
                    let dst = ((block_y * 4 + y) * width + block_x * 4 + x) * 4;
                    output[dst..dst + 3].copy_from_slice(&tile[src..src + 3]);
                    let a = if nibble % 2 == 0 {
                        alpha_block[nibble / 2] & 0xF
                    } else {
                        alpha_block[nibble / 2] >> 4
                    };
                    output[dst + 3] = a << 4 | a;
                    nibble += 1;
                }
            }
        }
    }
    output
}

/// Decodes one 8-byte block (already byte-reversed) into a 4x4 RGB tile.
fn decode_block(block: &[u8; 8]) -> [u8; 48] {
    let color = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
    let pixels = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);
    let flip = color & 0x0100_0000 != 0;
    let diff = color & 0x0200_0000 != 0;

    let (r1, g1, b1, r2, g2, b2) = if diff {
        // 5-bit base color plus a sign-extended 3-bit delta for the second
        // sub-block, both re-expanded to 8 bits.
        let r = color & 0xF8;
        let g = (color >> 8) & 0xF8;
        let b = (color >> 16) & 0xF8;
        let r2 = ((r >> 3) as i32 + sign_extend_3(color)) as u32;
        let g2 = ((g >> 3) as i32 + sign_extend_3(color >> 8)) as u32;
        let b2 = ((b >> 3) as i32 + sign_extend_3(color >> 16)) as u32;
        (
            (r | r >> 5) as u8,
            (g | g >> 5) as u8,
            (b | b >> 5) as u8,
            (r2 << 3 | r2 >> 2) as u8,
            (g2 << 3 | g2 >> 2) as u8,
            (b2 << 3 | b2 >> 2) as u8,
        )
    } else {
        // Two independent 4-bit colors, nibble-replicated.
        let r1 = color & 0xF0;
        let g1 = (color >> 8) & 0xF0;
        let b1 = (color >> 16) & 0xF0;
        let r2 = (color & 0xF) << 4;
        let g2 = (color >> 4) & 0xF0;
        let b2 = (color >> 12) & 0xF0;
        (
            (r1 | r1 >> 4) as u8,
            (g1 | g1 >> 4) as u8,
            (b1 | b1 >> 4) as u8,
            (r2 | r2 >> 4) as u8,
            (g2 | g2 >> 4) as u8,
            (b2 | b2 >> 4) as u8,
        )
    };
    let table1 = (color >> 29 & 7) as usize;
    let table2 = (color >> 26 & 7) as usize;

    let mut tile = [0; 48];
    let mut set = |x: usize, y: usize, pixel: [u8; 3]| {
        let index = (y * 4 + x) * 3;
        tile[index..index + 3].copy_from_slice(&pixel);
    };
    if flip {
        // Top/bottom 4x2 sub-blocks.
        for y in 0..2 {
            for x in 0..4 {
                set(x, y, modify(r1, g1, b1, x, y, pixels, table1));
                set(x, y + 2, modify(r2, g2, b2, x, y + 2, pixels, table2));
            }
        }
    } else {
        // Left/right 2x4 sub-blocks.
        for y in 0..4 {
            for x in 0..2 {
                set(x, y, modify(r1, g1, b1, x, y, pixels, table1));
                set(x + 2, y, modify(r2, g2, b2, x + 2, y, pixels, table2));
            }
        }
    }
    tile
}

/// Applies the intensity modifier selected by texel (x, y)'s 2-bit code. The
/// two index bits live in separate 16-bit halves of the pixel word, and the
/// halves swap meaning at linear index 8.
fn modify(r: u8, g: u8, b: u8, x: usize, y: usize, pixels: u32, table: usize) -> [u8; 3] {
    let index = x * 4 + y;
    let msb = pixels << 1;
    let selector = if index < 8 {
        ((pixels >> (index + 24)) & 1) + ((msb >> (index + 8)) & 2)
    } else {
        ((pixels >> (index + 8)) & 1) + ((msb >> (index - 8)) & 2)
    };
    let modifier = MODIFIER_TABLE[table][selector as usize];
    [
        saturate(r as i32 + modifier),
        saturate(g as i32 + modifier),
        saturate(b as i32 + modifier),
    ]
}

fn sign_extend_3(value: u32) -> i32 {
    ((value as i32) << 29) >> 29
}

fn saturate(value: i32) -> u8 {
    if value > 255 {
        255
    } else if value < 0 {
        0
    } else {
        value as u8
    }
}

#[cfg(test)]
mod test {
    use super::{decompress, saturate, MODIFIER_TABLE};

    #[test]
    fn saturate_clamps_every_modifier() {
        for base in 0..=255 {
            for row in &MODIFIER_TABLE {
                for &modifier in row {
                    let expected = (base + modifier).max(0).min(255) as u8;
                    assert_eq!(expected, saturate(base + modifier));
                }
            }
        }
    }

    #[test]
    fn all_zero_block_decodes_to_smallest_modifier() {
        // Individual mode, black base colors, table 0: every texel picks
        // modifier +2.
        let block = [0; 8];
        let output = decompress(&block, 4, 4, false);
        assert_eq!(64, output.len());
        for pixel in output.chunks(4) {
            assert_eq!([2, 2, 2, 255], pixel);
        }
    }

    #[test]
    fn differential_white_block_saturates() {
        // Differential mode with a maximal 5-bit base and zero deltas; both
        // sub-blocks decode to pure white after the +2 modifier saturates.
        let color: u32 = 0x0200_0000 | 0x00F8_F8F8;
        let mut stream = [0; 8];
        for (i, byte) in color.to_le_bytes().iter().enumerate() {
            stream[7 - i] = *byte;
        }
        let output = decompress(&stream, 4, 4, false);
        for pixel in output.chunks(4) {
            assert_eq!([255, 255, 255, 255], pixel);
        }
    }

    #[test]
    fn alpha_nibbles_are_consumed_column_major() {
        let mut block = [0; 16];
        // First alpha byte: low nibble 0x1 for texel (0, 0), high nibble 0x2
        // for texel (0, 1).
        block[0] = 0x21;
        let output = decompress(&block, 4, 4, true);
        let alpha_at = |x: usize, y: usize| output[(y * 4 + x) * 4 + 3];
        assert_eq!(0x11, alpha_at(0, 0));
        assert_eq!(0x22, alpha_at(0, 1));
        assert_eq!(0x00, alpha_at(1, 0));
    }

    #[test]
    fn opaque_alpha_block_replicates_to_255() {
        let mut block = [0; 16];
        for byte in block.iter_mut().take(8) {
            *byte = 0xFF;
        }
        let output = decompress(&block, 4, 4, true);
        for pixel in output.chunks(4) {
            assert_eq!(255, pixel[3]);
        }
    }
}
