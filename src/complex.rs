use num::complex::Complex;

pub type C<T> = Complex<T>;

pub fn c(re: f64, im: f64) -> C<f64> {
    Complex::new(re, im)
}

pub fn cr(re: f64) -> C<f64> {
    c(re, 0.0)
}

pub fn ci(im: f64) -> C<f64> {
    c(0.0, im)
}

/// Parses `"re,im"` into a complex number.
pub fn parse_complex(s: &str) -> Option<C<f64>> {
    let (re, im) = s.split_once(',')?;
    match (re.trim().parse::<f64>(), im.trim().parse::<f64>()) {
        (Ok(re), Ok(im)) => Some(c(re, im)),
        _ => None,
    }
}
