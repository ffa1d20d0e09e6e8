/// A decoded texture. `pixel_data` is row-major RGBA8888 with straight alpha,
/// `width * height * 4` bytes.
pub struct Texture {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub pixel_data: Vec<u8>,
}
