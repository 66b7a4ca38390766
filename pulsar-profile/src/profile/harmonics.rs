//! Fourier decomposition of the profile.
use super::{VonMisesProfile, builder};
use rustfft::{FftPlanner, num_complex::Complex};

/// Number of harmonics retained beyond half the grid resolution.
const HARMONIC_MARGIN: usize = 10;

/// Computes the cosine coefficients of the raw template, divided by the zeroth coefficient.
///
/// The template is even, so the transform is real. It is sampled at twice the grid
/// resolution so that every retained harmonic lies below the Nyquist index.
pub(super) fn normalised_harmonics(kappa: f64, grid_resolution: usize) -> Vec<f64> {
    let len = grid_resolution / 2 + HARMONIC_MARGIN;
    let nfft = 2 * grid_resolution;

    let mut buffer = (0..nfft)
        .map(|i| Complex::new(builder::template(kappa, i as f64 / nfft as f64), 0.0))
        .collect::<Vec<_>>();
    FftPlanner::<f64>::new()
        .plan_fft_forward(nfft)
        .process(&mut buffer);

    let dc = buffer[0].re;
    buffer.iter().take(len).map(|c| c.re / dc).collect()
}

impl VonMisesProfile {
    /// Cosine coefficients of the profile before detrending, normalised so the first is one.
    pub fn harmonics(&self) -> &[f64] {
        &self.harmonics
    }

    /// Returns `count` normalised cosine coefficients, zero-padded beyond those computed.
    ///
    /// If `count` is zero, all computed coefficients are returned.
    pub fn fourier(&self, count: usize) -> Vec<f64> {
        let count = match count {
            0 => self.harmonics.len(),
            n => n,
        };
        let mut out = vec![0.0; count];
        for (value, harmonic) in out.iter_mut().zip(&self.harmonics) {
            *value = *harmonic;
        }
        out
    }

    /// Returns the Fourier transform of the profile,
    /// ```text
    /// rho_m = int_0^1 dphi rho(phi) e^{2 pi i m phi}
    /// ```
    /// which is real and symmetric in `m`. The DC mode `rho_0` equals
    /// [Self::template_mean_flux] unless the profile was detrended, in which case it is zero.
    ///
    /// If `count` is zero, the number of internally computed harmonics is returned.
    /// Beyond that length the output is zero-padded.
    pub fn profile_fft(&self, count: usize) -> Vec<f64> {
        let count = match count {
            0 => self.harmonics.len(),
            n => n,
        };
        let mut out = vec![0.0; count];
        self.fill_profile_fft(&mut out);
        out
    }

    /// As [Self::profile_fft], writing `out.len()` coefficients into `out`.
    pub fn fill_profile_fft(&self, out: &mut [f64]) {
        out.fill(0.0);
        for (rho, harmonic) in out.iter_mut().zip(&self.harmonics) {
            *rho = self.template_mean_flux * harmonic;
        }
        if self.detrend {
            if let Some(dc) = out.first_mut() {
                *dc = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// `I_m(kappa) / I_0(kappa)`, from the power series of the modified Bessel functions.
    fn bessel_ratio(m: u32, kappa: f64) -> f64 {
        let series = |m: u32| {
            let x = 0.25 * kappa * kappa;
            let mut term = (1..=m).fold(1.0, |acc, j| acc * 0.5 * kappa / j as f64);
            let mut sum = term;
            for k in 1..300 {
                term *= x / (k as f64 * (k + m) as f64);
                sum += term;
            }
            sum
        };
        series(m) / series(0)
    }

    #[test]
    fn zeroth_is_one() {
        for detrend in [false, true] {
            let profile = VonMisesProfile::new(0.1, detrend, 0).unwrap();
            assert_eq!(profile.harmonics()[0], 1.0);
            assert_eq!(
                profile.harmonics().len(),
                profile.grid_resolution() / 2 + HARMONIC_MARGIN
            );
        }
    }

    #[test]
    fn matches_bessel_functions() {
        let profile = VonMisesProfile::new(0.1, false, 0).unwrap();
        for m in [1, 2, 5, 10, 20] {
            assert_approx_eq!(
                profile.harmonics()[m as usize],
                bessel_ratio(m, profile.kappa()),
                1e-10
            );
        }
    }

    #[test]
    fn reconstructs_peak() {
        let profile = VonMisesProfile::new(0.1, false, 0).unwrap();
        let fft = profile.profile_fft(0);
        let peak = fft[0] + 2.0 * fft[1..].iter().sum::<f64>();
        assert_approx_eq!(peak, 1.0, 1e-10);
    }

    #[test]
    fn dc_mode_follows_detrend() {
        let raw = VonMisesProfile::new(0.1, false, 0).unwrap();
        assert_eq!(raw.profile_fft(1), vec![raw.template_mean_flux()]);

        let detrended = VonMisesProfile::new(0.1, true, 0).unwrap();
        let fft = detrended.profile_fft(3);
        assert_eq!(fft[0], 0.0);
        assert_eq!(fft[1], raw.profile_fft(3)[1]);
    }

    #[test]
    fn zero_padded() {
        let profile = VonMisesProfile::new(0.3, false, 64).unwrap();
        let retained = profile.harmonics().len();
        let fft = profile.profile_fft(retained + 25);
        assert_eq!(fft.len(), retained + 25);
        assert!(fft[retained..].iter().all(|&rho| rho == 0.0));
        assert_eq!(profile.profile_fft(0).len(), retained);

        let fourier = profile.fourier(retained + 5);
        assert_eq!(&fourier[..retained], profile.harmonics());
        assert!(fourier[retained..].iter().all(|&h| h == 0.0));
        assert_eq!(profile.fourier(0), profile.harmonics());

        let mut out = [f64::NAN; 4];
        profile.fill_profile_fft(&mut out);
        assert_eq!(out.to_vec(), profile.profile_fft(4));
    }
}
