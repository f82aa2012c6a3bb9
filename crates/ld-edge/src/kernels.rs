use ld_core::Error;

/// Separable Sobel kernel pair of odd length `size`.
///
/// Conventions:
/// - `smooth` is the binomial row of order `size - 1` (`[1, 2, 1]` for 3).
/// - `diff` is the binomial row of order `size - 3` convolved with the
///   central difference `[-1, 0, 1]` (`[-1, 0, 1]` for 3).
/// - Both are applied as correlations, so `diff` yields `I(x+1) - I(x-1)`
///   at size 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SobelKernel1D {
    pub size: usize,
    pub radius: usize,
    pub smooth: Vec<i32>,
    pub diff: Vec<i32>,
}

impl SobelKernel1D {
    pub const SUPPORTED_SIZES: [usize; 3] = [3, 5, 7];

    pub fn new(size: usize) -> Result<Self, Error> {
        if !Self::SUPPORTED_SIZES.contains(&size) {
            return Err(Error::InvalidConfig("sobel kernel size must be 3, 5 or 7"));
        }

        let smooth = binomial_row(size - 1);
        let base = binomial_row(size - 3);
        let mut diff = vec![0i32; size];
        for (i, &b) in base.iter().enumerate() {
            diff[i] -= b;
            diff[i + 2] += b;
        }

        Ok(Self {
            size,
            radius: size / 2,
            smooth,
            diff,
        })
    }
}

fn binomial_row(order: usize) -> Vec<i32> {
    let mut row = vec![1i32];
    for _ in 0..order {
        let mut next = vec![1i32; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}
