//! Identifier <-> RGBA color codec.

use std::fmt;

/// Raw value that decodes from the clear color: "no object under cursor".
pub const NO_OBJECT: u32 = u32::MAX;

/// Identifier of a pickable object, assigned by enumeration order.
///
/// Any `u32` except [`NO_OBJECT`] is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Largest encodable identifier.
    pub const MAX: u32 = NO_OBJECT - 1;

    /// Wrap a raw identifier, rejecting the sentinel.
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == NO_OBJECT {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw identifier.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An encoded pick color as RGBA bytes, in `Rgba8Unorm` texel byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickColor(pub [u8; 4]);

impl PickColor {
    /// Color the ID buffer is cleared to each frame.
    pub const CLEAR: Self = Self([0; 4]);

    /// Encode `id + 1` with the least significant byte in red.
    ///
    /// The offset keeps identifier 0 distinct from [`Self::CLEAR`].
    pub const fn encode(id: ObjectId) -> Self {
        let packed = id.0 + 1;
        Self([
            (packed & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            ((packed >> 16) & 0xFF) as u8,
            ((packed >> 24) & 0xFF) as u8,
        ])
    }

    /// Unpack the channels and remove the offset. [`Self::CLEAR`] yields
    /// [`NO_OBJECT`].
    pub const fn decode_raw(self) -> u32 {
        let [r, g, b, a] = self.0;
        let packed =
            (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24);
        packed.wrapping_sub(1)
    }

    /// Decode to an identifier, or `None` for the background.
    pub const fn decode(self) -> Option<ObjectId> {
        ObjectId::new(self.decode_raw())
    }

    /// Channels as normalized floats, as written by the ID fragment shader.
    pub fn to_unorm(self) -> [f32; 4] {
        self.0.map(|c| f32::from(c) / 255.0)
    }

    /// Channels as a wgpu clear color.
    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.0.map(|c| f64::from(c) / 255.0);
        wgpu::Color { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn id(raw: u32) -> ObjectId {
        ObjectId::new(raw).unwrap()
    }

    #[test]
    fn decode_inverts_encode() {
        for raw in [0, 1, 2, 3, 254, 255, 256, 65_535, 1 << 24, ObjectId::MAX] {
            assert_eq!(PickColor::encode(id(raw)).decode(), Some(id(raw)));
        }
    }

    #[test]
    fn encode_is_injective_across_byte_boundaries() {
        let ids = (0..1024)
            .chain(0xFF_F0..0x1_0010)
            .chain(ObjectId::MAX - 1024..=ObjectId::MAX);
        let mut seen = HashSet::new();
        for raw in ids {
            assert!(seen.insert(PickColor::encode(id(raw))), "collision at {raw}");
        }
    }

    #[test]
    fn clear_color_decodes_to_sentinel() {
        assert_eq!(PickColor::CLEAR.decode_raw(), NO_OBJECT);
        assert_eq!(PickColor::CLEAR.decode(), None);
    }

    #[test]
    fn id_zero_is_not_the_clear_color() {
        let zero = PickColor::encode(id(0));
        assert_ne!(zero, PickColor::CLEAR);
        assert_eq!(zero.0, [1, 0, 0, 0]);
    }

    #[test]
    fn low_byte_goes_to_red() {
        assert_eq!(PickColor::encode(id(0x0403_0200)).0, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn sentinel_is_not_an_identifier() {
        assert_eq!(ObjectId::new(NO_OBJECT), None);
        assert_eq!(ObjectId::new(ObjectId::MAX).map(ObjectId::get), Some(u32::MAX - 1));
    }

    #[test]
    fn unorm_round_trips_every_byte() {
        for byte in 0..=255u8 {
            let color = PickColor([byte; 4]);
            let back = color.to_unorm().map(|c| (c * 255.0).round() as u8);
            assert_eq!(back, [byte; 4]);
        }
    }

    #[test]
    fn clear_color_is_transparent_black() {
        let c = PickColor::CLEAR.to_wgpu();
        assert_eq!((c.r, c.g, c.b, c.a), (0.0, 0.0, 0.0, 0.0));
    }
}
