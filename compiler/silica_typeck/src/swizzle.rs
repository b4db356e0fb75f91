//! Vector swizzle parsing.

use std::fmt;

/// A parsed swizzle: up to four component indices into a vector.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Swizzle {
    components: [u8; 4],
    len: u8,
}

impl Swizzle {
    /// Parse a member name as a swizzle over a vector of `base_len`
    /// components. All characters must come from one component-name set
    /// (`xyzw`, `rgba` or `stpq`) and stay in range.
    pub fn parse(field: &str, base_len: u32) -> Option<Swizzle> {
        if field.is_empty() || field.len() > 4 {
            return None;
        }
        let set: &[char; 4] = match field.chars().next()? {
            'x' | 'y' | 'z' | 'w' => &['x', 'y', 'z', 'w'],
            'r' | 'g' | 'b' | 'a' => &['r', 'g', 'b', 'a'],
            's' | 't' | 'p' | 'q' => &['s', 't', 'p', 'q'],
            _ => return None,
        };

        let mut components = [0u8; 4];
        let mut len = 0u8;
        for ch in field.chars() {
            let index = set.iter().position(|&c| c == ch)? as u8;
            if u32::from(index) >= base_len {
                return None;
            }
            components[len as usize] = index;
            len += 1;
        }
        Some(Swizzle { components, len })
    }

    pub fn len(self) -> u32 {
        u32::from(self.len)
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Component indices in order.
    pub fn components(&self) -> &[u8] {
        &self.components[..self.len as usize]
    }
}

impl fmt::Display for Swizzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &index in self.components() {
            write!(f, "{}", ['x', 'y', 'z', 'w'][index as usize])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_xyzw() {
        let swizzle = Swizzle::parse("xyz", 4).expect("valid swizzle");
        assert_eq!(swizzle.components(), &[0, 1, 2]);
        assert_eq!(swizzle.len(), 3);
        assert_eq!(swizzle.to_string(), "xyz");
    }

    #[test]
    fn parse_rgba_maps_to_indices() {
        let swizzle = Swizzle::parse("bgra", 4).expect("valid swizzle");
        assert_eq!(swizzle.components(), &[2, 1, 0, 3]);
    }

    #[test]
    fn parse_stpq() {
        let swizzle = Swizzle::parse("st", 2).expect("valid swizzle");
        assert_eq!(swizzle.components(), &[0, 1]);
    }

    #[test]
    fn repeats_are_allowed() {
        let swizzle = Swizzle::parse("xxx", 2).expect("valid swizzle");
        assert_eq!(swizzle.components(), &[0, 0, 0]);
    }

    #[test]
    fn mixed_sets_are_rejected() {
        assert_eq!(Swizzle::parse("xg", 4), None);
    }

    #[test]
    fn out_of_range_component_is_rejected() {
        assert_eq!(Swizzle::parse("z", 2), None);
        assert_eq!(Swizzle::parse("w", 3), None);
    }

    #[test]
    fn too_long_is_rejected() {
        assert_eq!(Swizzle::parse("xyzwx", 4), None);
    }

    #[test]
    fn non_component_chars_are_rejected() {
        assert_eq!(Swizzle::parse("foo", 4), None);
        assert_eq!(Swizzle::parse("", 4), None);
    }
}
