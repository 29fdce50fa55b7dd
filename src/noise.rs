//! Deterministic lattice noise shared by the CPU shading reference and the
//! `noise/lattice3` WGSL snippet. Both sides implement the same integer hash
//! and trilinear smoothing so a (cell, time) sample matches across them.

use glam::Vec3;

/// Hashes an integer lattice point to a float in [-1, 1].
pub fn hash31(x: i32, y: i32, z: i32) -> f32 {
    let mut h = 0x9e37_79b9u32
        ^ (x as u32).wrapping_mul(0x8da6_b343)
        ^ (y as u32).wrapping_mul(0xd816_3841)
        ^ (z as u32).wrapping_mul(0xcb1a_b31f);
    h ^= h >> 13;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    (h as f32 / u32::MAX as f32) * 2.0 - 1.0
}

/// Smooth value noise over the integer lattice, continuous in all arguments
/// and deterministic for a given input. Range is [-1, 1].
pub fn value_noise3(p: Vec3) -> f32 {
    let base = p.floor();
    let frac = p - base;
    let (x, y, z) = (base.x as i32, base.y as i32, base.z as i32);

    let u = fade(frac.x);
    let v = fade(frac.y);
    let w = fade(frac.z);

    let c000 = hash31(x, y, z);
    let c100 = hash31(x + 1, y, z);
    let c010 = hash31(x, y + 1, z);
    let c110 = hash31(x + 1, y + 1, z);
    let c001 = hash31(x, y, z + 1);
    let c101 = hash31(x + 1, y, z + 1);
    let c011 = hash31(x, y + 1, z + 1);
    let c111 = hash31(x + 1, y + 1, z + 1);

    let bottom = lerp(lerp(c000, c100, u), lerp(c010, c110, u), v);
    let top = lerp(lerp(c001, c101, u), lerp(c011, c111, u), v);
    lerp(bottom, top, w)
}

fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic() {
        let p = Vec3::new(3.25, -1.5, 0.75);
        assert_eq!(value_noise3(p), value_noise3(p));
    }

    #[test]
    fn noise_varies_with_time_at_lattice_points() {
        let a = value_noise3(Vec3::new(0.0, 0.0, 0.0));
        let b = value_noise3(Vec3::new(0.0, 0.0, 1.0));
        assert_ne!(a, b);
    }

    #[test]
    fn noise_stays_in_range() {
        for i in 0..64 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.71, i as f32 * 0.13);
            let n = value_noise3(p);
            assert!((-1.0..=1.0).contains(&n), "out of range: {n}");
        }
    }

    #[test]
    fn noise_is_continuous_in_time() {
        let p = Vec3::new(4.0, 2.0, 0.5);
        let step = 1e-3;
        let a = value_noise3(p);
        let b = value_noise3(p + Vec3::new(0.0, 0.0, step));
        assert!((a - b).abs() < 0.05);
    }

    #[test]
    fn hash_covers_negative_coordinates() {
        assert_ne!(hash31(-1, 0, 0), hash31(1, 0, 0));
        assert!((-1.0..=1.0).contains(&hash31(-7, 13, -2)));
    }
}
