use crate::texture::Texture;
use crate::texture_format::TextureFormat;
use crate::{texture_decoder, CmabError};
use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::SHIFT_JIS;
use std::io::prelude::BufRead;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

type Result<T> = std::result::Result<T, CmabError>;

/// Metadata for one texture in the archive's `txpt` table, in on-disk order.
pub struct TextureEntry {
    pub name: String,
    pub size: usize,
    pub flags1: u16,
    pub flags2: u16,
    pub width: usize,
    pub height: usize,
    pub format: u32,
    pub offset: usize,
    pub id: u32,
}

/// A parsed CMAB archive. Construction reads the full entry and name tables;
/// texel payloads stay raw until [`Cmab::decode`] is called.
pub struct Cmab {
    entries: Vec<TextureEntry>,
    data: Vec<u8>,
}

impl Cmab {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Cmab::from_bytes(std::fs::read(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut reader = Cursor::new(data.as_slice());
        if &read_tag(&mut reader)? != b"cmab" {
            return Err(CmabError::InvalidMagic);
        }
        skip(&mut reader, 0x10)?;
        let string_table_base = read_u32(&mut reader)? as u64;
        let info_table_base = read_u32(&mut reader)? as u64;
        let payload_base = read_u32(&mut reader)? as usize;
        if read_u32(&mut reader)? != 0xFFFFFFFF {
            return Err(CmabError::MissingSentinel);
        }
        skip(&mut reader, 0xC)?;
        let info_table_relative_offset = read_u32(&mut reader)? as u64;

        // Texture info table.
        seek(&mut reader, string_table_base + info_table_relative_offset)?;
        if &read_tag(&mut reader)? != b"txpt" {
            return Err(CmabError::MissingChunk("txpt"));
        }
        let entry_count = read_u32(&mut reader)?;
        let mut entries: Vec<TextureEntry> = Vec::new();
        for _ in 0..entry_count {
            let size = read_u32(&mut reader)? as usize;
            let flags1 = read_u16(&mut reader)?;
            let flags2 = read_u16(&mut reader)?;
            let width = read_u16(&mut reader)? as usize;
            let height = read_u16(&mut reader)? as usize;
            let format = read_u32(&mut reader)?;
            let offset = read_u32(&mut reader)? as usize + payload_base;
            let id = read_u32(&mut reader)?;
            entries.push(TextureEntry {
                name: String::new(),
                size,
                flags1,
                flags2,
                width,
                height,
                format,
                offset,
                id,
            });
        }

        // String table. The name count normally matches the entry count; an
        // archive that names more entries than it declares is malformed.
        if &read_tag(&mut reader)? != b"strt" {
            return Err(CmabError::MissingChunk("strt"));
        }
        let name_count = read_u32(&mut reader)? as u64;
        for index in 0..name_count {
            if index >= entries.len() as u64 {
                return Err(CmabError::NameTableOverrun(index as usize));
            }
            seek(&mut reader, info_table_base + index * 4 + 8)?;
            let name_offset = read_u32(&mut reader)? as u64;
            seek(&mut reader, info_table_base + name_count * 4 + 8 + name_offset)?;
            entries[index as usize].name = read_c_string(&mut reader)?;
        }

        Ok(Cmab { entries, data })
    }

    /// All texture entries, preserving the archive's table order.
    pub fn entries(&self) -> &[TextureEntry] {
        &self.entries
    }

    /// First entry with the given name, if any. Duplicate names are legal.
    pub fn find_by_name(&self, name: &str) -> Option<&TextureEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Decodes one entry's texel payload into a [`Texture`]. Nothing is
    /// cached; each call re-reads and re-converts.
    pub fn decode(&self, entry: &TextureEntry) -> Result<Texture> {
        let format = TextureFormat::from_code(entry.format)?;
        let end = entry
            .offset
            .checked_add(entry.size)
            .filter(|end| *end <= self.data.len())
            .ok_or(CmabError::TruncatedArchive)?;
        let pixel_data =
            texture_decoder::decode(&self.data[entry.offset..end], entry.width, entry.height, format)?;
        Ok(Texture {
            name: entry.name.clone(),
            width: entry.width,
            height: entry.height,
            pixel_data,
        })
    }

    /// Decodes every entry in table order.
    pub fn textures(&self) -> Result<Vec<Texture>> {
        self.entries.iter().map(|entry| self.decode(entry)).collect()
    }
}

/// Reads a null-terminated string at the cursor's position.
pub fn read_c_string(reader: &mut Cursor<&[u8]>) -> Result<String> {
    let mut buffer: Vec<u8> = Vec::new();
    reader
        .read_until(0x0, &mut buffer)
        .map_err(|_| CmabError::TruncatedArchive)?;
    if buffer.pop() != Some(0x0) {
        return Err(CmabError::TruncatedArchive);
    }
    let (result, _, errors) = SHIFT_JIS.decode(buffer.as_slice());
    if errors {
        return Err(CmabError::BadName);
    }
    Ok(result.into())
}

fn read_tag(reader: &mut Cursor<&[u8]>) -> Result<[u8; 4]> {
    let mut tag = [0; 4];
    reader
        .read_exact(&mut tag)
        .map_err(|_| CmabError::TruncatedArchive)?;
    Ok(tag)
}

fn read_u16(reader: &mut Cursor<&[u8]>) -> Result<u16> {
    reader
        .read_u16::<LittleEndian>()
        .map_err(|_| CmabError::TruncatedArchive)
}

fn read_u32(reader: &mut Cursor<&[u8]>) -> Result<u32> {
    reader
        .read_u32::<LittleEndian>()
        .map_err(|_| CmabError::TruncatedArchive)
}

fn skip(reader: &mut Cursor<&[u8]>, amount: i64) -> Result<()> {
    reader
        .seek(SeekFrom::Current(amount))
        .map_err(|_| CmabError::TruncatedArchive)?;
    Ok(())
}

fn seek(reader: &mut Cursor<&[u8]>, position: u64) -> Result<()> {
    reader
        .seek(SeekFrom::Start(position))
        .map_err(|_| CmabError::TruncatedArchive)?;
    Ok(())
}
