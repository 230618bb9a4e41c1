//! Value-to-pixel scales for the two charts.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Round tick values (1, 2 or 5 times a power of ten) covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        if count == 0 || !start.is_finite() || !stop.is_finite() {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }

        let raw_step = (stop - start) / count as f64;
        let power = 10f64.powf(raw_step.log10().floor());
        let error = raw_step / power;
        let step = if error >= 50f64.sqrt() {
            power * 10.0
        } else if error >= 10f64.sqrt() {
            power * 5.0
        } else if error >= 2f64.sqrt() {
            power * 2.0
        } else {
            power
        };

        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Evenly spaced categorical bands with inner and outer padding.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let n = domain.len() as f64;
        let padding = padding.clamp(0.0, 1.0);
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn band_at(&self, idx: usize) -> f64 {
        self.start + self.step * idx as f64
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    domain: (f64, f64),
    from: Rgb,
    to: Rgb,
}

impl ColorScale {
    pub const LIGHT: Rgb = Rgb(0xf7, 0xfb, 0xff);
    pub const BLUE: Rgb = Rgb(0x00, 0x00, 0xff);

    pub fn new(domain: (f64, f64), from: Rgb, to: Rgb) -> Self {
        Self { domain, from, to }
    }

    pub fn blues(max: f64) -> Self {
        Self::new((0.0, max), Self::LIGHT, Self::BLUE)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn map(&self, value: f64) -> Rgb {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 {
            0.5
        } else {
            ((value - d0) / (d1 - d0)).clamp(0.0, 1.0)
        };
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(
            lerp(self.from.0, self.to.0),
            lerp(self.from.1, self.to.1),
            lerp(self.from.2, self.to.2),
        )
    }
}
