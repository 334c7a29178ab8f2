//! Forward/inverse 2-D discrete Fourier transforms on a square mesh.
//!
//! The Poisson solver only sees the [`SpectralTransform`] trait, so its
//! tests are independent of the FFT backend. [`RustFft2d`] is the default
//! implementation on top of `rustfft`.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::{Result, SimError};

/// 2-D transform of `size × size` row-major grids.
///
/// `inverse(forward(x))` must reproduce `x`, i.e. the inverse carries
/// the `1 / size²` normalization.
pub trait SpectralTransform: Send + Sync {
    /// Number of cells per side.
    fn size(&self) -> usize;

    /// Real grid to complex spectrum.
    fn forward(&self, real: &[f64]) -> Result<Vec<Complex64>>;

    /// Complex spectrum back to the (complex) spatial grid.
    fn inverse(&self, spectrum: &[Complex64]) -> Result<Vec<Complex64>>;

    /// Inverse transform keeping only the real part; the imaginary
    /// residue left by round-off is dropped.
    fn inverse_real(&self, spectrum: &[Complex64]) -> Result<Vec<f64>> {
        Ok(self.inverse(spectrum)?.into_iter().map(|c| c.re).collect())
    }
}

/// Row-column 2-D FFT built from two planned length-`size` 1-D FFTs.
///
/// ### Fields
/// - `size` - Cells per side.
/// - `fft_forward` - Planned forward 1-D transform, reused for rows and columns.
/// - `fft_inverse` - Planned inverse 1-D transform.
pub struct RustFft2d {
    size: usize,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
}

impl RustFft2d {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(SimError::Transform(
                "cannot plan a transform of size 0".to_string(),
            ));
        }
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(size);
        let fft_inverse = planner.plan_fft_inverse(size);
        Ok(Self {
            size,
            fft_forward,
            fft_inverse,
        })
    }

    fn check_len(&self, len: usize) -> Result<()> {
        let expected = self.size * self.size;
        if len != expected {
            return Err(SimError::Transform(format!(
                "expected {expected} cells for a {n}x{n} grid, got {len}",
                n = self.size
            )));
        }
        Ok(())
    }

    /// Transforms every row, then every column, in place.
    fn process_2d(&self, data: &mut [Complex64], fft: &Arc<dyn Fft<f64>>) {
        let n = self.size;
        data.par_chunks_mut(n).for_each(|row| fft.process(row));
        transpose_square(data, n);
        data.par_chunks_mut(n).for_each(|col| fft.process(col));
        transpose_square(data, n);
    }
}

impl SpectralTransform for RustFft2d {
    fn size(&self) -> usize {
        self.size
    }

    fn forward(&self, real: &[f64]) -> Result<Vec<Complex64>> {
        self.check_len(real.len())?;
        let mut data: Vec<Complex64> = real.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        self.process_2d(&mut data, &self.fft_forward);
        Ok(data)
    }

    fn inverse(&self, spectrum: &[Complex64]) -> Result<Vec<Complex64>> {
        self.check_len(spectrum.len())?;
        let mut data = spectrum.to_vec();
        self.process_2d(&mut data, &self.fft_inverse);
        // rustfft leaves the inverse unnormalized
        let scale = 1.0 / (self.size * self.size) as f64;
        for c in &mut data {
            *c *= scale;
        }
        Ok(data)
    }
}

fn transpose_square(data: &mut [Complex64], n: usize) {
    for i in 0..n {
        for j in (i + 1)..n {
            data.swap(i * n + j, j * n + i);
        }
    }
}

/// Runs a forward/inverse round trip on a fixed non-trivial grid.
///
/// ### Returns
/// - `Ok(err)` with the observed max relative error if it is within
///   `tolerance`.
/// - `Err(SimError::Transform)` if the transform fails or the error
///   exceeds `tolerance`.
pub fn verify_round_trip(transform: &dyn SpectralTransform, tolerance: f64) -> Result<f64> {
    let n = transform.size();
    let probe: Vec<f64> = (0..n * n)
        .map(|i| {
            let t = i as f64;
            1.0 + (0.37 * t).sin() + 0.5 * (1.3 * t).cos()
        })
        .collect();

    let back = transform.inverse_real(&transform.forward(&probe)?)?;
    if back.len() != probe.len() {
        return Err(SimError::Transform(format!(
            "round trip changed grid length from {} to {}",
            probe.len(),
            back.len()
        )));
    }

    let scale = probe.iter().fold(0.0_f64, |m, x| m.max(x.abs())).max(f64::MIN_POSITIVE);
    let max_diff = probe
        .iter()
        .zip(&back)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);
    let rel = max_diff / scale;

    if !rel.is_finite() || rel > tolerance {
        return Err(SimError::Transform(format!(
            "round-trip relative error {rel:e} exceeds tolerance {tolerance:e}"
        )));
    }
    Ok(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_size_cannot_be_planned() {
        assert!(matches!(RustFft2d::new(0), Err(SimError::Transform(_))));
    }

    #[test]
    fn forward_rejects_wrong_length() {
        let fft = RustFft2d::new(4).unwrap();
        assert!(matches!(
            fft.forward(&[0.0; 15]),
            Err(SimError::Transform(_))
        ));
    }

    #[test]
    fn forward_of_constant_grid_is_pure_dc() {
        let fft = RustFft2d::new(4).unwrap();
        let spectrum = fft.forward(&[2.0; 16]).unwrap();
        assert_abs_diff_eq!(spectrum[0].re, 32.0, epsilon = 1e-12);
        for c in &spectrum[1..] {
            assert_abs_diff_eq!(c.norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn forward_of_unit_impulse_is_flat() {
        let fft = RustFft2d::new(2).unwrap();
        let spectrum = fft.forward(&[1.0, 0.0, 0.0, 0.0]).unwrap();
        for c in &spectrum {
            assert_abs_diff_eq!(c.re, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(c.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_row_mode_lands_in_expected_bin() {
        // cos(2π ix / n) along the first axis peaks at rows 1 and n-1 of column 0
        let n = 8;
        let grid: Vec<f64> = (0..n * n)
            .map(|i| (2.0 * std::f64::consts::PI * (i / n) as f64 / n as f64).cos())
            .collect();
        let fft = RustFft2d::new(n).unwrap();
        let spectrum = fft.forward(&grid).unwrap();
        let half = (n * n) as f64 / 2.0;
        assert_abs_diff_eq!(spectrum[n].re, half, epsilon = 1e-9);
        assert_abs_diff_eq!(spectrum[(n - 1) * n].re, half, epsilon = 1e-9);
        assert_abs_diff_eq!(spectrum[1].norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn round_trip_reproduces_input() {
        for n in [1, 2, 5, 16, 64] {
            let fft = RustFft2d::new(n).unwrap();
            let rel = verify_round_trip(&fft, 1e-10).unwrap();
            assert!(rel <= 1e-10, "size {n}: relative error {rel}");
        }
    }

    struct Lossy(RustFft2d);

    impl SpectralTransform for Lossy {
        fn size(&self) -> usize {
            self.0.size()
        }
        fn forward(&self, real: &[f64]) -> Result<Vec<Complex64>> {
            self.0.forward(real)
        }
        fn inverse(&self, spectrum: &[Complex64]) -> Result<Vec<Complex64>> {
            let mut out = self.0.inverse(spectrum)?;
            out[0] += Complex64::new(0.1, 0.0);
            Ok(out)
        }
    }

    #[test]
    fn round_trip_check_flags_a_broken_transform() {
        let lossy = Lossy(RustFft2d::new(4).unwrap());
        assert!(matches!(
            verify_round_trip(&lossy, 1e-5),
            Err(SimError::Transform(_))
        ));
    }
}
