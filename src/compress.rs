/// Longest run or literal block a single PackBits header can describe.
pub(crate) const MAX_BLOCK: usize = 128;

/// TIFF PackBits encoding of one raster line.
///
/// A header `n` in `0..=127` is followed by `n + 1` literal bytes; a header `n` in
/// `-127..=-1` (as `u8`) is followed by one byte repeated `1 - n` times.
pub fn pack_bits(data: &[u8]) -> Vec<u8> {
    let mut packed = Vec::with_capacity(data.len() + data.len() / MAX_BLOCK + 1);
    let mut i = 0;

    while i < data.len() {
        let run_length = run_at(data, i);

        if run_length > 1 {
            packed.push((1 - run_length as i32) as i8 as u8);
            packed.push(data[i]);
            i += run_length;
        } else {
            let start = i;
            // A literal ends where a repeat of two or more bytes begins.
            while i < data.len() && i - start < MAX_BLOCK && run_at(data, i) < 2 {
                i += 1;
            }
            packed.push((i - start - 1) as u8);
            packed.extend_from_slice(&data[start..i]);
        }
    }

    packed
}

fn run_at(data: &[u8], start: usize) -> usize {
    let value = data[start];
    data[start..]
        .iter()
        .take(MAX_BLOCK)
        .take_while(|&&b| b == value)
        .count()
}
