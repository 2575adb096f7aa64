//! Exact squared Euclidean distance transform (Felzenszwalb & Huttenlocher), run as one pass over
//! the rows and one over the columns.

use crate::Grid;

/// Stands in for "no obstacle seen yet" without producing NaN in the envelope arithmetic.
const FAR: f64 = f64::MAX / 4.0;

/// Replaces every value with the squared world-space distance to the nearest cell holding `0`.
///
/// Cells are `len_x` by `len_y` units. Nonzero inputs act as `+inf`. If no cell holds `0`, every
/// value ends up at least `FAR`.
pub(crate) fn squared_distance_transform(field: &mut Grid<f64>, len_x: f64, len_y: f64) {
    let (width, height) = (field.width() as usize, field.height() as usize);
    if width == 0 || height == 0 {
        return;
    }
    for value in field.storage_mut() {
        *value = if *value == 0.0 { 0.0 } else { FAR };
    }

    let longest = width.max(height);
    let mut v = vec![0usize; longest];
    let mut z = vec![0.0f64; longest + 1];
    let mut column = vec![0.0f64; height];
    let mut out = vec![0.0f64; longest];

    let data = field.storage_mut();
    for row in data.chunks_mut(width) {
        dt_1d(row, &mut out[..width], len_x * len_x, &mut v, &mut z);
        row.copy_from_slice(&out[..width]);
    }

    for x in 0..width {
        for (y, value) in column.iter_mut().enumerate() {
            *value = data[y * width + x];
        }
        dt_1d(&column, &mut out[..height], len_y * len_y, &mut v, &mut z);
        for (y, &value) in out[..height].iter().enumerate() {
            data[y * width + x] = value;
        }
    }
}

/// `output[q] = min over p of input[p] + weight * (q - p)^2`, via the lower envelope of parabolas.
///
/// `v` needs `input.len()` slots and `z` one more.
fn dt_1d(input: &[f64], output: &mut [f64], weight: f64, v: &mut [usize], z: &mut [f64]) {
    let n = input.len();
    if n == 0 {
        return;
    }
    let base = |i: usize| input[i] + weight * (i as f64) * (i as f64);

    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        loop {
            let vk = v[k];
            let s = (base(q) - base(vk)) / (2.0 * weight * (q - vk) as f64);
            if s > z[k] {
                k += 1;
                v[k] = q;
                z[k] = s;
                z[k + 1] = f64::INFINITY;
                break;
            }
            if k == 0 {
                v[0] = q;
                z[0] = f64::NEG_INFINITY;
                z[1] = f64::INFINITY;
                break;
            }
            k -= 1;
        }
    }

    k = 0;
    for (q, out) in output.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let d = q as f64 - v[k] as f64;
        *out = input[v[k]] + weight * d * d;
    }
}
