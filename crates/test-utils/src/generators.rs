//! Test data generators for synthetic climate rasters.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates a 2-D grid whose values encode their own position.
///
/// Each cell value is calculated as: `row * 1000 + col`
///
/// # Returns
///
/// A `Vec<f64>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(4, 3);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[1], 1.0);    // row=0, col=1
/// assert_eq!(grid[4], 1000.0); // row=1, col=0
/// ```
pub fn create_index_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((row * 1000 + col) as f64);
        }
    }
    data
}

/// Creates a packed temperature grid.
///
/// Values are stored as `int16` with `scale = 0.01` and `offset = 273.15`
/// (see [`crate::fixtures::packing`]), covering roughly 250K to 310K from
/// the top-left to the bottom-right corner.
pub fn create_packed_temperature_grid(width: usize, height: usize) -> Vec<i16> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f64 / width.max(1) as f64;
            let y_factor = row as f64 / height.max(1) as f64;
            let kelvin = 250.0 + x_factor * 30.0 + y_factor * 30.0;
            data.push(((kelvin - 273.15) / 0.01).round() as i16);
        }
    }
    data
}

/// Creates a 3-D categorical cube (`depth × height × width`) of class codes
/// in `0..classes`.
///
/// Deterministic for a given seed.
pub fn create_category_cube(depth: usize, height: usize, width: usize, classes: u8, seed: u32) -> Vec<u8> {
    let classes = u32::from(classes.max(1));
    let mut data = Vec::with_capacity(depth * height * width);
    for z in 0..depth {
        for row in 0..height {
            for col in 0..width {
                let hash = simple_hash(col as u32, (z * height + row) as u32, seed);
                data.push((hash % classes) as u8);
            }
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid<T: Copy>(width: usize, height: usize, value: T) -> Vec<T> {
    vec![value; width * height]
}

/// Creates a grid with a sentinel value at specified positions.
///
/// # Arguments
///
/// * `values` - Base grid in row-major order
/// * `width` - Number of columns
/// * `sentinel` - Missing-value token to write
/// * `positions` - List of (row, col) positions to overwrite
pub fn with_sentinels<T: Copy>(mut values: Vec<T>, width: usize, sentinel: T, positions: &[(usize, usize)]) -> Vec<T> {
    for &(row, col) in positions {
        let index = row * width + col;
        if col < width && index < values.len() {
            values[index] = sentinel;
        }
    }
    values
}

/// Reinterpret a typed buffer as native-endian bytes, the way raster blocks
/// arrive from the storage layer.
pub fn to_native_bytes<T: bytemuck::Pod>(values: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

/// `count` consecutive indices starting at `start`.
pub fn index_run(start: i64, count: usize) -> Vec<i64> {
    (start..start + count as i64).collect()
}

/// Equal weights summing to one.
pub fn uniform_weights(count: usize) -> Vec<f64> {
    vec![1.0 / count.max(1) as f64; count]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_index_grid() {
        let grid = create_index_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[1], 1.0);
        assert_eq!(grid[10], 1000.0);
        assert_eq!(grid[11], 1001.0);
    }

    #[test]
    fn test_packed_temperature_range() {
        let grid = create_packed_temperature_grid(100, 100);
        assert_eq!(grid.len(), 10000);
        let kelvin: Vec<f64> = grid.iter().map(|&v| v as f64 * 0.01 + 273.15).collect();
        let min = kelvin.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = kelvin.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(min >= 249.99, "min {min}");
        assert!(max <= 310.01, "max {max}");
    }

    #[test]
    fn test_category_cube_deterministic() {
        let a = create_category_cube(3, 4, 5, 6, 42);
        let b = create_category_cube(3, 4, 5, 6, 42);
        assert_eq!(a, b, "Same seed should produce same data");
        assert_eq!(a.len(), 60);
        assert!(a.iter().all(|&c| c < 6));

        let c = create_category_cube(3, 4, 5, 6, 43);
        assert_ne!(a, c, "Different seed should produce different data");
    }

    #[test]
    fn test_with_sentinels() {
        let grid = with_sentinels(create_constant_grid(4, 4, 1.0f64), 4, -999.0, &[(2, 2), (9, 0)]);
        assert_eq!(grid[10], -999.0);
        assert_eq!(grid.iter().filter(|&&v| v == -999.0).count(), 1);
    }

    #[test]
    fn test_native_bytes() {
        let bytes = to_native_bytes(&[1u16, 2u16]);
        assert_eq!(bytes.len(), 4);
        assert_eq!(u16::from_ne_bytes([bytes[0], bytes[1]]), 1);
    }

    #[test]
    fn test_index_helpers() {
        assert_eq!(index_run(-1, 3), vec![-1, 0, 1]);
        let weights = uniform_weights(4);
        assert_eq!(weights.iter().sum::<f64>(), 1.0);
    }
}
