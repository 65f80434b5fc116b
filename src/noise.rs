use crate::rng::lattice_value;

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Bilinear value noise on the integer lattice, roughly in `[-1, 1]`.
pub fn value_noise(x: f64, y: f64, seed: u64) -> f64 {
    let (x0, y0) = (x.floor(), y.floor());
    let (ix, iy) = (x0 as i64, y0 as i64);
    let sx = smoothstep(x - x0);
    let sy = smoothstep(y - y0);

    let v00 = lattice_value(ix, iy, seed);
    let v10 = lattice_value(ix + 1, iy, seed);
    let v01 = lattice_value(ix, iy + 1, seed);
    let v11 = lattice_value(ix + 1, iy + 1, seed);

    let a = v00 + (v10 - v00) * sx;
    let b = v01 + (v11 - v01) * sx;
    a + (b - a) * sy
}

/// Fractal sum of `octaves` value-noise layers, normalised by total amplitude.
pub fn fbm(x: f64, y: f64, seed: u64, octaves: u32, freq0: f64) -> f64 {
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut amp = 1.0;
    let mut freq = freq0;
    for i in 0..octaves {
        // Offset each octave so lattice points don't line up.
        let shift = 17.0 * i as f64;
        sum += value_noise(x * freq + shift, y * freq - shift, seed.wrapping_add(i as u64)) * amp;
        norm += amp;
        amp *= 0.5;
        freq *= 2.0;
    }
    if norm > 0.0 { sum / norm } else { 0.0 }
}
