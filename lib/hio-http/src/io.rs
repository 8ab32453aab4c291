/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read bytes into `buf` until `delim` is found or `max_len` bytes have been
/// consumed, whichever comes first.
///
/// Returns whether the delimiter was found and how many bytes were read.
/// An early EOF is reported as `(false, n)` with `n < max_len`.
pub(crate) async fn limited_read_until<R>(
    reader: &mut R,
    delim: u8,
    max_len: usize,
    buf: &mut Vec<u8>,
) -> io::Result<(bool, usize)>
where
    R: AsyncBufRead + Unpin,
{
    let mut total = 0usize;
    loop {
        let limit = max_len - total;
        let nr = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok((false, total));
            }
            match memchr::memchr(delim, available) {
                Some(p) if p < limit => {
                    buf.extend_from_slice(&available[0..=p]);
                    p + 1
                }
                _ => {
                    let to_copy = available.len().min(limit);
                    buf.extend_from_slice(&available[0..to_copy]);
                    to_copy
                }
            }
        };
        reader.consume(nr);
        total += nr;
        if buf.last() == Some(&delim) {
            return Ok((true, total));
        }
        if total >= max_len {
            return Ok((false, total));
        }
    }
}
