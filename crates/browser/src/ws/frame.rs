//! WebSocket frame codec
//!
//! Only what the DevTools wire needs: single-frame text messages out
//! (always masked from the client side), single-frame messages in.
//!
//! Known limitations of the reader:
//! - the mask bit of incoming frames is ignored, servers never mask
//! - fragmented messages (FIN clear / continuation frames) are not
//!   reassembled; each frame is returned on its own
//! - control frames (ping, close) come back as text like any other frame

use std::io::{self, Read};

/// FIN bit plus text opcode
pub const TEXT_FRAME: u8 = 0x81;

const MASK_BIT: u8 = 0x80;
const LEN_16: u8 = 126;
const LEN_64: u8 = 127;

/// Encode `payload` as a single text frame with a fresh random mask key
/// when `masked` is set.
pub fn encode_text_frame(payload: &str, masked: bool) -> Vec<u8> {
    let key = masked.then(rand::random::<[u8; 4]>);
    encode_with_key(payload.as_bytes(), key)
}

/// Encode with an explicit mask key (`None` for an unmasked frame)
pub fn encode_with_key(payload: &[u8], mask_key: Option<[u8; 4]>) -> Vec<u8> {
    let len = payload.len();
    let mask_flag = if mask_key.is_some() { MASK_BIT } else { 0 };

    let mut frame = Vec::with_capacity(len + 14);
    frame.push(TEXT_FRAME);
    if len < LEN_16 as usize {
        frame.push(len as u8 | mask_flag);
    } else if len <= u16::MAX as usize {
        frame.push(LEN_16 | mask_flag);
        frame.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        frame.push(LEN_64 | mask_flag);
        frame.extend_from_slice(&(len as u64).to_be_bytes());
    }

    match mask_key {
        Some(key) => {
            frame.extend_from_slice(&key);
            let start = frame.len();
            frame.extend_from_slice(payload);
            apply_mask(&mut frame[start..], key);
        }
        None => frame.extend_from_slice(payload),
    }
    frame
}

/// XOR `bytes` with the repeating 4-byte key. Self-inverse.
pub fn apply_mask(bytes: &mut [u8], key: [u8; 4]) {
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte ^= key[i % 4];
    }
}

/// Read one frame and return its payload as text.
///
/// Returns `Ok(None)` when the reader's timeout fires before the first
/// header byte arrives. A timeout after that point is an error: the
/// stream is no longer at a frame boundary.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<String>> {
    let mut head = [0u8; 2];
    loop {
        match reader.read(&mut head[..1]) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) => return Ok(None),
            Err(e) => return Err(e),
        }
    }
    reader.read_exact(&mut head[1..])?;

    let len = match head[1] & !MASK_BIT {
        LEN_16 => {
            let mut ext = [0u8; 2];
            reader.read_exact(&mut ext)?;
            u16::from_be_bytes(ext) as u64
        }
        LEN_64 => {
            let mut ext = [0u8; 8];
            reader.read_exact(&mut ext)?;
            u64::from_be_bytes(ext)
        }
        short => short as u64,
    };

    // read_to_end on a bounded reader keeps looping over short reads
    let mut payload = Vec::with_capacity(len.min(1 << 20) as usize);
    reader.by_ref().take(len).read_to_end(&mut payload)?;
    if (payload.len() as u64) < len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }

    Ok(Some(String::from_utf8_lossy(&payload).into_owned()))
}

pub(crate) fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
