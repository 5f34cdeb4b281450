use crate::memory::address;
use crate::memory::ioregisters::{IoRegister, ObjectSize, TileDataArea};
use crate::memory::AddressSpace;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// Width and height of the background canvas in pixels (32x32 tiles).
pub const BACKGROUND_SIZE: usize = 256;

const TILE_MAP_WIDTH: u16 = 32;
const OAM_ENTRY_COUNT: u16 = 40;

// Object coordinates are stored offset so that partially visible objects can be placed
const OBJECT_X_OFFSET: i32 = 8;
const OBJECT_Y_OFFSET: i32 = 16;

pub type FrameBuffer = [[u8; SCREEN_WIDTH]; SCREEN_HEIGHT];
pub type BackgroundBuffer = [[u8; BACKGROUND_SIZE]; BACKGROUND_SIZE];

/// One OAM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ObjectAttributes {
    y: u8,
    x: u8,
    tile_index: u8,
    flags: u8,
}

impl ObjectAttributes {
    fn read(address_space: &AddressSpace, index: u16) -> Self {
        let base = address::OAM_START + 4 * index;
        Self {
            y: address_space.read_address_u8(base),
            x: address_space.read_address_u8(base + 1),
            tile_index: address_space.read_address_u8(base + 2),
            flags: address_space.read_address_u8(base + 3),
        }
    }

    fn x_flip(self) -> bool {
        self.flags & 0x20 != 0
    }

    fn y_flip(self) -> bool {
        self.flags & 0x40 != 0
    }
}

/// Decode one 8-pixel tile row from its two bitplane bytes. The first byte holds bit 0 of each
/// color index and the second byte holds bit 1; the leftmost pixel is the most significant bit.
fn decode_tile_row(low: u8, high: u8) -> [u8; 8] {
    let mut pixels = [0; 8];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        let shift = 7 - i;
        *pixel = (((high >> shift) & 0x01) << 1) | ((low >> shift) & 0x01);
    }
    pixels
}

fn read_tile_row(address_space: &AddressSpace, tile_address: u16, row: u16) -> [u8; 8] {
    let row_address = tile_address.wrapping_add(2 * row);
    decode_tile_row(
        address_space.read_address_u8(row_address),
        address_space.read_address_u8(row_address.wrapping_add(1)),
    )
}

/// Picture generation. Renders a whole frame at once from the tile, tile map and object data in
/// video memory; there is no per-scanline state.
#[derive(Debug, Clone)]
pub struct Ppu {
    background: Box<BackgroundBuffer>,
    frame_buffer: Box<FrameBuffer>,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            background: Box::new([[0; BACKGROUND_SIZE]; BACKGROUND_SIZE]),
            frame_buffer: Box::new([[0; SCREEN_WIDTH]; SCREEN_HEIGHT]),
        }
    }

    /// The visible 160x144 frame as 2-bit color indices.
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    /// The 256x256 composition buffer that the frame is scrolled out of.
    pub fn background(&self) -> &BackgroundBuffer {
        &self.background
    }

    /// Render a frame from the current contents of video memory and the LCD registers.
    ///
    /// If the display is disabled neither buffer is touched, so callers see whatever was drawn
    /// last.
    pub fn draw_frame(&mut self, address_space: &AddressSpace) {
        let lcdc = address_space.lcdc();
        if !lcdc.display_enabled() {
            log::trace!("display disabled, skipping frame");
            return;
        }

        let tile_data_area = lcdc.tile_data_area();

        if lcdc.bg_enabled() {
            self.draw_tile_map(address_space, lcdc.bg_tile_map_address(), tile_data_area, false);
        } else {
            for row in self.background.iter_mut() {
                row.fill(0);
            }
        }

        if lcdc.window_enabled() {
            self.draw_tile_map(address_space, lcdc.window_tile_map_address(), tile_data_area, true);
        }

        let scx = address_space.read_address_u8(IoRegister::SCX.to_address());
        let scy = address_space.read_address_u8(IoRegister::SCY.to_address());
        self.copy_viewport(scx, scy);

        if lcdc.objects_enabled() {
            self.draw_objects(address_space, lcdc.object_size());
        }
    }

    fn draw_tile_map(
        &mut self,
        address_space: &AddressSpace,
        tile_map_address: u16,
        tile_data_area: TileDataArea,
        transparent_zero: bool,
    ) {
        for tile_row in 0..TILE_MAP_WIDTH {
            for tile_col in 0..TILE_MAP_WIDTH {
                let tile_index = address_space
                    .read_address_u8(tile_map_address + tile_row * TILE_MAP_WIDTH + tile_col);
                let tile_address = tile_data_area.tile_address(tile_index);

                for line in 0..8 {
                    let pixels = read_tile_row(address_space, tile_address, line);
                    let y = usize::from(8 * tile_row + line);
                    for (i, &pixel) in pixels.iter().enumerate() {
                        if transparent_zero && pixel == 0 {
                            continue;
                        }

                        let x = usize::from(8 * tile_col) + i;
                        self.background[y][x] = pixel;
                    }
                }
            }
        }
    }

    fn copy_viewport(&mut self, scx: u8, scy: u8) {
        for (y, frame_row) in self.frame_buffer.iter_mut().enumerate() {
            let source_y = y + usize::from(scy);
            for (x, pixel) in frame_row.iter_mut().enumerate() {
                let source_x = x + usize::from(scx);
                *pixel = self
                    .background
                    .get(source_y)
                    .and_then(|row| row.get(source_x))
                    .copied()
                    .unwrap_or(0);
            }
        }
    }

    fn draw_objects(&mut self, address_space: &AddressSpace, object_size: ObjectSize) {
        let height = u16::from(object_size.height());

        // Lower OAM entries are drawn last so that they end up on top
        for index in (0..OAM_ENTRY_COUNT).rev() {
            let object = ObjectAttributes::read(address_space, index);

            let tile_index = match object_size {
                ObjectSize::EightByEight => object.tile_index,
                ObjectSize::EightBySixteen => object.tile_index & 0xFE,
            };
            let top = i32::from(object.y) - OBJECT_Y_OFFSET;
            let left = i32::from(object.x) - OBJECT_X_OFFSET;

            for row in 0..height {
                let source_row = if object.y_flip() {
                    height - 1 - row
                } else {
                    row
                };
                // 8x16 objects continue into the next tile for their bottom half
                let tile_address = TileDataArea::Unsigned
                    .tile_address(tile_index.wrapping_add((source_row / 8) as u8));
                let pixels = read_tile_row(address_space, tile_address, source_row % 8);

                let y = top + i32::from(row);
                let Some(frame_row) =
                    usize::try_from(y).ok().and_then(|y| self.frame_buffer.get_mut(y))
                else {
                    continue;
                };

                for (i, &pixel) in pixels.iter().enumerate() {
                    if pixel == 0 {
                        continue;
                    }

                    let column = if object.x_flip() { 7 - i } else { i };
                    let x = left + column as i32;
                    if let Some(frame_pixel) =
                        usize::try_from(x).ok().and_then(|x| frame_row.get_mut(x))
                    {
                        *frame_pixel = pixel;
                    }
                }
            }
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
