/*
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::HttpBodyReadError;
use crate::HttpChunkSizeLine;

/// Body reader over a buffered stream, covering the three framing modes:
/// fixed content-length, chunked transfer encoding, and raw streaming.
///
/// Every read attempt is bounded by `idle_timeout`, measured from the last
/// successful read rather than from phase start. A slow sender keeps the
/// read alive as long as each gap between byte arrivals stays inside the
/// window; a stalled sender fails (or, in streaming mode, ends the body)
/// once one gap exceeds it.
pub struct HttpBodyReader<'a, R> {
    reader: &'a mut R,
    idle_timeout: Duration,
    chunk_line_max_len: usize,
}

impl<'a, R> HttpBodyReader<'a, R>
where
    R: AsyncBufRead + Unpin,
{
    const DEFAULT_CHUNK_LINE_MAX_LEN: usize = 64;

    pub fn new(reader: &'a mut R, idle_timeout: Duration) -> Self {
        HttpBodyReader {
            reader,
            idle_timeout,
            chunk_line_max_len: Self::DEFAULT_CHUNK_LINE_MAX_LEN,
        }
    }

    /// Read exactly `size` bytes into `out`.
    ///
    /// Bytes already buffered from the header phase over-read are counted
    /// first; accumulation stops exactly at `size`, never past it.
    pub async fn read_fixed(
        &mut self,
        size: u64,
        out: &mut Vec<u8>,
    ) -> Result<(), HttpBodyReadError> {
        let mut left = size;
        while left > 0 {
            let nr = {
                let data = self.fill_wait_data().await?;
                let to_copy = data.len().min(usize::try_from(left).unwrap_or(usize::MAX));
                out.extend_from_slice(&data[0..to_copy]);
                to_copy
            };
            self.reader.consume(nr);
            left -= nr as u64;
        }
        Ok(())
    }

    /// Decode a chunked transfer encoded body, invoking `cb` exactly once
    /// per non-empty chunk with exactly the chunk's payload bytes.
    ///
    /// A zero-size chunk line ends the body; no further bytes are read and
    /// `cb` is not invoked again. Returns the total payload length.
    pub async fn read_chunked<F>(&mut self, cb: &mut F) -> Result<u64, HttpBodyReadError>
    where
        F: FnMut(&[u8]),
    {
        let mut line = Vec::<u8>::with_capacity(Self::DEFAULT_CHUNK_LINE_MAX_LEN);
        let mut chunk = Vec::<u8>::new();
        let mut total = 0u64;
        loop {
            line.clear();
            self.read_line(&mut line).await?;
            let size = HttpChunkSizeLine::parse(&line)
                .map_err(HttpBodyReadError::InvalidChunkLine)?
                .size;
            if size == 0 {
                return Ok(total);
            }

            chunk.clear();
            self.read_fixed(size, &mut chunk).await?;
            cb(&chunk);
            total += size;

            // the chunk data's own terminating CRLF
            line.clear();
            self.read_line(&mut line).await?;
            if line != b"\r\n" && line != b"\n" {
                return Err(HttpBodyReadError::InvalidChunkEnd);
            }
        }
    }

    /// Raw streaming mode: deliver every newly available byte run to `cb`
    /// with no framing interpretation.
    ///
    /// Both EOF and an idle-timeout expiry end the stream successfully;
    /// returns the total number of bytes delivered.
    pub async fn read_stream<F>(&mut self, cb: &mut F) -> Result<u64, HttpBodyReadError>
    where
        F: FnMut(&[u8]),
    {
        let mut total = 0u64;
        loop {
            let nr = {
                let data =
                    match tokio::time::timeout(self.idle_timeout, self.reader.fill_buf()).await {
                        Ok(Ok(data)) => data,
                        Ok(Err(e)) => return Err(e.into()),
                        Err(_) => return Ok(total),
                    };
                if data.is_empty() {
                    return Ok(total);
                }
                cb(data);
                data.len()
            };
            self.reader.consume(nr);
            total += nr as u64;
        }
    }

    async fn fill_wait_data(&mut self) -> Result<&[u8], HttpBodyReadError> {
        let data = match tokio::time::timeout(self.idle_timeout, self.reader.fill_buf()).await {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(HttpBodyReadError::IdleTimeout),
        };
        if data.is_empty() {
            return Err(HttpBodyReadError::ReaderClosed);
        }
        Ok(data)
    }

    async fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<(), HttpBodyReadError> {
        loop {
            let nr = {
                let data = self.fill_wait_data().await?;
                match memchr::memchr(b'\n', data) {
                    Some(p) => {
                        buf.extend_from_slice(&data[0..=p]);
                        p + 1
                    }
                    None => {
                        buf.extend_from_slice(data);
                        data.len()
                    }
                }
            };
            self.reader.consume(nr);
            if buf.last() == Some(&b'\n') {
                return Ok(());
            }
            if buf.len() >= self.chunk_line_max_len {
                return Err(HttpBodyReadError::LineTooLong(self.chunk_line_max_len));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio_stream::iter;
    use tokio_util::io::StreamReader;

    const IDLE: Duration = Duration::from_millis(100);

    fn stream_of(parts: Vec<&'static [u8]>) -> BufReader<impl tokio::io::AsyncRead + Unpin> {
        let stream = iter(parts.into_iter().map(std::io::Result::Ok));
        BufReader::new(StreamReader::new(stream))
    }

    #[tokio::test]
    async fn fixed_exact() {
        let mut reader = stream_of(vec![b"hello world"]);
        let mut body = Vec::new();
        HttpBodyReader::new(&mut reader, IDLE)
            .read_fixed(5, &mut body)
            .await
            .unwrap();
        assert_eq!(body, b"hello");
        // bytes past the declared length stay in the reader
        let mut rest = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut rest)
            .await
            .unwrap();
        assert_eq!(rest, " world");
    }

    #[tokio::test]
    async fn fixed_split_reads() {
        let mut reader = stream_of(vec![b"he", b"l", b"lo"]);
        let mut body = Vec::new();
        HttpBodyReader::new(&mut reader, IDLE)
            .read_fixed(5, &mut body)
            .await
            .unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn fixed_truncated() {
        let mut reader = stream_of(vec![b"hell"]);
        let mut body = Vec::new();
        let r = HttpBodyReader::new(&mut reader, IDLE)
            .read_fixed(10, &mut body)
            .await;
        assert!(matches!(r, Err(HttpBodyReadError::ReaderClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_idle_timeout() {
        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(b"hell").await.unwrap();
        let mut reader = BufReader::new(rx);
        let mut body = Vec::new();
        // the sender stalls after 4 of 10 bytes and never closes
        let r = HttpBodyReader::new(&mut reader, IDLE)
            .read_fixed(10, &mut body)
            .await;
        assert!(matches!(r, Err(HttpBodyReadError::IdleTimeout)));
        assert_eq!(body, b"hell");
    }

    #[tokio::test]
    async fn chunked_single() {
        let mut reader = stream_of(vec![b"5\r\nhello\r\n0\r\n\r\n"]);
        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let total = HttpBodyReader::new(&mut reader, IDLE)
            .read_chunked(&mut |data: &[u8]| chunks.push(data.to_vec()))
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(chunks, vec![b"hello".to_vec()]);
        // the final CRLF after the zero-size line is intentionally not consumed
        let mut rest = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut rest)
            .await
            .unwrap();
        assert_eq!(rest, b"\r\n");
    }

    #[tokio::test]
    async fn chunked_multi_split() {
        let mut reader = stream_of(vec![b"3\r\nfoo\r\n", b"4\r\nba", b"rs\r\n", b"0\r\n"]);
        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let total = HttpBodyReader::new(&mut reader, IDLE)
            .read_chunked(&mut |data: &[u8]| chunks.push(data.to_vec()))
            .await
            .unwrap();
        assert_eq!(total, 7);
        assert_eq!(chunks, vec![b"foo".to_vec(), b"bars".to_vec()]);
    }

    #[tokio::test]
    async fn chunked_malformed_size() {
        let mut reader = stream_of(vec![b"zz\r\nhello\r\n"]);
        let mut called = false;
        let r = HttpBodyReader::new(&mut reader, IDLE)
            .read_chunked(&mut |_: &[u8]| called = true)
            .await;
        assert!(matches!(r, Err(HttpBodyReadError::InvalidChunkLine(_))));
        assert!(!called);
    }

    #[tokio::test]
    async fn chunked_missing_data_crlf() {
        let mut reader = stream_of(vec![b"3\r\nfooXX\r\n0\r\n"]);
        let mut chunks = 0usize;
        let r = HttpBodyReader::new(&mut reader, IDLE)
            .read_chunked(&mut |_: &[u8]| chunks += 1)
            .await;
        assert!(matches!(r, Err(HttpBodyReadError::InvalidChunkEnd)));
        // the first chunk was already delivered and is not retracted
        assert_eq!(chunks, 1);
    }

    #[tokio::test]
    async fn stream_until_eof() {
        let mut reader = stream_of(vec![b"raw ", b"bytes"]);
        let mut seen = Vec::new();
        let total = HttpBodyReader::new(&mut reader, IDLE)
            .read_stream(&mut |data: &[u8]| seen.extend_from_slice(data))
            .await
            .unwrap();
        assert_eq!(total, 9);
        assert_eq!(seen, b"raw bytes");
    }

    #[tokio::test(start_paused = true)]
    async fn stream_until_idle() {
        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(b"tick").await.unwrap();
        let mut reader = BufReader::new(rx);
        let mut seen = Vec::new();
        // the sender goes quiet without closing; streaming ends cleanly
        let total = HttpBodyReader::new(&mut reader, IDLE)
            .read_stream(&mut |data: &[u8]| seen.extend_from_slice(data))
            .await
            .unwrap();
        assert_eq!(total, 4);
        assert_eq!(seen, b"tick");
    }
}
