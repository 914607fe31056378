//! In-place radix-2 butterfly transform over a zero-padded real signal
//!
//! The butterfly network runs without a bit-reversal pass and uses the
//! half-angle twiddle `k * PI / N` with the rotation
//!
//! ```text
//! tpre =  a.re * cos + a.im * sin
//! tpim = -a.re * sin + a.im * cos
//! ```
//!
//! where `a` is the far element of each pair. Scores downstream are
//! calibrated against exactly this output, so the convention must not be
//! "corrected" to a textbook DFT.

use std::f64::consts::PI;

/// Real and imaginary parts of a transformed signal
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl Spectrum {
    /// Number of bins (always a power of two, or zero)
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// `sqrt(re^2 + im^2)` per bin
    pub fn magnitudes(&self) -> Vec<f64> {
        self.real
            .iter()
            .zip(self.imag.iter())
            .map(|(&re, &im)| (re * re + im * im).sqrt())
            .collect()
    }
}

/// Transform length for a signal: next power of two at or above `len`
///
/// An empty signal has no transform.
pub fn padded_len(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        len.next_power_of_two()
    }
}

/// Transform a real signal, zero-padding it to `padded_len(signal.len())`
pub fn transform(signal: &[f64]) -> Spectrum {
    let n = padded_len(signal.len());
    let mut real = vec![0.0; n];
    let mut imag = vec![0.0; n];
    real[..signal.len()].copy_from_slice(signal);

    if n < 2 {
        return Spectrum { real, imag };
    }

    let (cos_table, sin_table) = twiddles(n);

    let mut size = 1;
    while size < n {
        let table_step = n / (size * 2);
        for block in (0..n).step_by(size * 2) {
            for (offset, j) in (block..block + size).enumerate() {
                let k = offset * table_step;
                let (cos, sin) = (cos_table[k], sin_table[k]);
                let far = j + size;

                let tpre = real[far] * cos + imag[far] * sin;
                let tpim = -real[far] * sin + imag[far] * cos;

                real[far] = real[j] - tpre;
                imag[far] = imag[j] - tpim;
                real[j] += tpre;
                imag[j] += tpim;
            }
        }
        size *= 2;
    }

    Spectrum { real, imag }
}

/// `cos(k*PI/n)` and `sin(k*PI/n)` for every `k` the butterflies reach
fn twiddles(n: usize) -> (Vec<f64>, Vec<f64>) {
    let count = n / 2;
    let mut cos_table = Vec::with_capacity(count);
    let mut sin_table = Vec::with_capacity(count);
    for k in 0..count {
        let angle = k as f64 * PI / n as f64;
        cos_table.push(angle.cos());
        sin_table.push(angle.sin());
    }
    (cos_table, sin_table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 1);
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(64), 64);
        assert_eq!(padded_len(65), 128);
    }

    #[test]
    fn test_constant_signal_collapses_to_dc() {
        let spectrum = transform(&[128.0; 64]);
        let mags = spectrum.magnitudes();
        assert_eq!(mags.len(), 64);
        assert!((mags[0] - 128.0 * 64.0).abs() < 1e-9);
        assert!(mags[1..].iter().all(|&m| m.abs() < 1e-9));
    }

    #[test]
    fn test_zero_padding_appends_zeros() {
        let spectrum = transform(&[1.0, 1.0, 1.0]);
        assert_eq!(spectrum.len(), 4);
        // bin 0 is the plain sum regardless of twiddles
        assert!((spectrum.real[0] - 3.0).abs() < 1e-12);
        assert!(spectrum.imag[0].abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_is_identity() {
        let spectrum = transform(&[42.0]);
        assert_eq!(spectrum.real, vec![42.0]);
        assert_eq!(spectrum.imag, vec![0.0]);
    }

    #[test]
    fn test_two_point_butterfly() {
        // size=1, k=0: t = x[1]; x[1] = x[0] - x[1]; x[0] += x[1]
        let spectrum = transform(&[5.0, 3.0]);
        assert_eq!(spectrum.real, vec![8.0, 2.0]);
        assert_eq!(spectrum.imag, vec![0.0, 0.0]);
    }

    #[test]
    fn test_four_point_half_angle_twiddle() {
        // Second stage uses k=1 -> angle PI/4 on the odd pair
        let spectrum = transform(&[0.0, 1.0, 0.0, 0.0]);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        // after stage 1: [1, -1, 0, 0]
        // stage 2, j=0 (k=0): t=(0,0) -> x0=1, x2=1
        // stage 2, j=1 (k=1): a=(0,0) -> t=(0,0) -> x1=-1, x3=-1
        assert_eq!(spectrum.real, vec![1.0, -1.0, 1.0, -1.0]);
        assert!(spectrum.imag.iter().all(|&v| v == 0.0));

        let spectrum = transform(&[0.0, 0.0, 0.0, 1.0]);
        // after stage 1: [0, 0, 1, -1]
        // stage 2, j=1 (k=1): a=x3=(-1,0) -> t=(-s, s)
        //   x3 = x1 - t = (s, -s); x1 = x1 + t = (-s, s)
        assert!((spectrum.real[1] + s).abs() < 1e-12);
        assert!((spectrum.imag[1] - s).abs() < 1e-12);
        assert!((spectrum.real[3] - s).abs() < 1e-12);
        assert!((spectrum.imag[3] + s).abs() < 1e-12);
    }

    #[test]
    fn test_empty_signal() {
        let spectrum = transform(&[]);
        assert!(spectrum.is_empty());
        assert!(spectrum.magnitudes().is_empty());
    }
}
