//! Merge eligibility and merge color.

use crate::tile::{Tile, TileColor};
use rand::Rng;
use tracing::instrument;

/// Merge results whose color is flipped after the normal color rule.
pub const COLOR_FLIP_VALUES: [u32; 2] = [32, 256];

/// Largest value that can still take part in a merge.
///
/// Doubling it stays within `u32`; tiles above it never merge.
pub const MAX_MERGEABLE_VALUE: u32 = 1 << 30;

/// True if two tiles could merge, ignoring per-move bookkeeping.
///
/// A wildcard on either side only needs equal values; otherwise value and
/// color must both match. Values above [`MAX_MERGEABLE_VALUE`] never merge.
pub fn compatible(a: &Tile, b: &Tile) -> bool {
    if a.value() != b.value() || a.value() > MAX_MERGEABLE_VALUE {
        return false;
    }
    a.kind().is_wildcard() || b.kind().is_wildcard() || a.color() == b.color()
}

/// Merge eligibility during a move.
///
/// False if either tile is absent or already absorbed a merge this move.
pub fn can_merge(a: Option<&Tile>, b: Option<&Tile>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.merged_this_move() && !b.merged_this_move() && compatible(a, b),
        _ => false,
    }
}

/// Color of the tile produced when `from` merges into `to`.
///
/// Two wildcards pick a random color; one wildcard yields the other tile's
/// color; otherwise the destination's color wins. Values in
/// [`COLOR_FLIP_VALUES`] then flip the result unconditionally.
#[instrument(skip_all, fields(from = %from.id(), to = %to.id(), new_value))]
pub fn merge_color<R: Rng>(from: &Tile, to: &Tile, new_value: u32, rng: &mut R) -> TileColor {
    let color = match (from.kind().is_wildcard(), to.kind().is_wildcard()) {
        (true, true) => TileColor::random(rng),
        (true, false) => to.color(),
        (false, true) => from.color(),
        (false, false) => to.color(),
    };
    if COLOR_FLIP_VALUES.contains(&new_value) {
        color.flipped()
    } else {
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{TileId, TileKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn tile(value: u32, color: TileColor, kind: TileKind) -> Tile {
        Tile::new(TileId(0), value, color, kind)
    }

    #[test]
    fn test_same_value_same_color_merges() {
        let a = tile(8, TileColor::Red, TileKind::Normal);
        let b = tile(8, TileColor::Red, TileKind::Normal);
        assert!(can_merge(Some(&a), Some(&b)));
    }

    #[test]
    fn test_different_color_blocks_merge() {
        let a = tile(8, TileColor::Red, TileKind::Normal);
        let b = tile(8, TileColor::Blue, TileKind::Normal);
        assert!(!can_merge(Some(&a), Some(&b)));
    }

    #[test]
    fn test_wildcard_ignores_color() {
        let a = tile(2, TileColor::Red, TileKind::Wildcard);
        let b = tile(2, TileColor::Blue, TileKind::Normal);
        assert!(can_merge(Some(&a), Some(&b)));
        assert!(can_merge(Some(&b), Some(&a)));
    }

    #[test]
    fn test_wildcard_still_needs_equal_value() {
        let a = tile(2, TileColor::Red, TileKind::Wildcard);
        let b = tile(4, TileColor::Red, TileKind::Normal);
        assert!(!can_merge(Some(&a), Some(&b)));
    }

    #[test]
    fn test_converter_has_no_merge_privilege() {
        let a = tile(4, TileColor::Red, TileKind::Converter);
        let b = tile(4, TileColor::Blue, TileKind::Normal);
        assert!(!can_merge(Some(&a), Some(&b)));
    }

    #[test]
    fn test_absent_or_merged_tiles_never_merge() {
        let a = tile(4, TileColor::Red, TileKind::Normal);
        let mut b = tile(2, TileColor::Red, TileKind::Normal);
        assert!(!can_merge(Some(&a), None));
        assert!(!can_merge(None, Some(&a)));
        b.absorb(4, TileColor::Red);
        assert!(!can_merge(Some(&a), Some(&b)));
        assert!(compatible(&a, &b));
    }

    #[test]
    fn test_color_rules() {
        let mut rng = StdRng::seed_from_u64(0);
        let red = tile(4, TileColor::Red, TileKind::Normal);
        let blue = tile(4, TileColor::Blue, TileKind::Normal);
        let wild_blue = tile(4, TileColor::Blue, TileKind::Wildcard);

        assert_eq!(merge_color(&red, &red, 8, &mut rng), TileColor::Red);
        assert_eq!(merge_color(&wild_blue, &red, 8, &mut rng), TileColor::Red);
        assert_eq!(merge_color(&red, &wild_blue, 8, &mut rng), TileColor::Red);
        assert_eq!(merge_color(&blue, &blue, 8, &mut rng), TileColor::Blue);
    }

    #[test]
    fn test_flip_values_override() {
        let mut rng = StdRng::seed_from_u64(0);
        let red16 = tile(16, TileColor::Red, TileKind::Normal);
        let blue128 = tile(128, TileColor::Blue, TileKind::Normal);
        assert_eq!(merge_color(&red16, &red16, 32, &mut rng), TileColor::Blue);
        assert_eq!(merge_color(&blue128, &blue128, 256, &mut rng), TileColor::Red);
    }

    #[test]
    fn test_flip_applies_only_at_fixed_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let red32 = tile(32, TileColor::Red, TileKind::Normal);
        let red256 = tile(256, TileColor::Red, TileKind::Normal);
        assert_eq!(merge_color(&red32, &red32, 64, &mut rng), TileColor::Red);
        assert_eq!(merge_color(&red256, &red256, 512, &mut rng), TileColor::Red);
    }

    #[test]
    fn test_largest_tiles_never_merge() {
        let top = tile(1 << 31, TileColor::Red, TileKind::Normal);
        let wild_top = tile(1 << 31, TileColor::Red, TileKind::Wildcard);
        assert!(!compatible(&top, &top));
        assert!(!compatible(&top, &wild_top));
        let limit = tile(MAX_MERGEABLE_VALUE, TileColor::Red, TileKind::Normal);
        assert!(compatible(&limit, &limit));
    }

    #[test]
    fn test_double_wildcard_color_is_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let wild = tile(2, TileColor::Red, TileKind::Wildcard);
        let colors: Vec<_> = (0..64)
            .map(|_| merge_color(&wild, &wild, 4, &mut rng))
            .collect();
        assert!(colors.contains(&TileColor::Red));
        assert!(colors.contains(&TileColor::Blue));
    }
}
