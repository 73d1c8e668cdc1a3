//! Domain name encoding and compressed-name decoding.

use mailnet_domain::DnsError;

/// Capacity of a decoded host name, terminator included.
pub const MAX_HOST_NAME: usize = 256;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const POINTER_MASK: u8 = 0xc0;
const MAX_POINTER_JUMPS: usize = 128;

/// Decodes the possibly compressed name starting at `offset` in `msg`.
///
/// Returns the dotted name (no trailing dot, `""` for the root) and the
/// number of bytes the name occupies at `offset`. Once the first compression
/// pointer is followed, only its 2 bytes count towards that length.
///
/// Labels must be valid UTF-8, so the decoded text is exactly as long as the
/// label bytes it came from.
///
/// `max_text` bounds the decoded text the way a fixed destination would,
/// counting one byte per dot plus a terminator; 0 disables the bound.
pub fn read_name(
    msg: &[u8],
    offset: usize,
    max_text: usize,
) -> Result<(String, usize), DnsError> {
    let len = msg.len();
    let mut cur = offset;
    let mut consumed = 0usize;
    let mut text_len = 0usize;
    let mut jumped = false;
    let mut jumps = 0usize;
    let mut labels: Vec<&str> = Vec::new();

    loop {
        let byte = *msg.get(cur).ok_or(DnsError::BadNameRecord)?;
        if byte == 0 {
            break;
        }

        if byte & POINTER_MASK != 0 {
            let low = *msg.get(cur + 1).ok_or(DnsError::BadNameRecord)?;
            let target = usize::from(u16::from_be_bytes([byte, low]) & 0x3fff);
            if target >= len {
                return Err(DnsError::BadNameRecord);
            }

            jumps += 1;
            if jumps > MAX_POINTER_JUMPS {
                return Err(DnsError::BadNameRecord);
            }
            if !jumped {
                consumed += 2;
                jumped = true;
            }
            cur = target;
            continue;
        }

        let label_len = usize::from(byte);
        if (max_text > 0 && text_len + label_len + 2 >= max_text) || cur + label_len + 1 >= len
        {
            return Err(DnsError::BadNameRecord);
        }

        let label = std::str::from_utf8(&msg[cur + 1..cur + 1 + label_len])
            .map_err(|_| DnsError::BadNameRecord)?;
        labels.push(label);
        text_len += label_len + 1;
        if !jumped {
            consumed += label_len + 1;
        }
        cur += label_len + 1;
        jumps = 0;
    }

    Ok((labels.join("."), if jumped { consumed } else { consumed + 1 }))
}

/// Appends `name` as length-prefixed labels plus the terminating zero byte.
///
/// Empty labels (leading, trailing or doubled dots) are skipped, so `"."`
/// encodes the root.
pub fn encode_name(name: &str, out: &mut Vec<u8>) -> Result<usize, DnsError> {
    let start = out.len();

    for label in name.split('.').filter(|l| !l.is_empty()) {
        if label.len() > MAX_LABEL_LEN {
            out.truncate(start);
            return Err(DnsError::InvalidName(format!(
                "label '{}' longer than {} bytes",
                label, MAX_LABEL_LEN
            )));
        }
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);

    let written = out.len() - start;
    if written > MAX_NAME_LEN {
        out.truncate(start);
        return Err(DnsError::InvalidName(format!(
            "'{}' longer than {} bytes on the wire",
            name, MAX_NAME_LEN
        )));
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        encode_name(name, &mut out).unwrap();
        out
    }

    #[test]
    fn test_plain_name_length_includes_terminator() {
        let msg = encoded("mail.example.test");
        let (name, consumed) = read_name(&msg, 0, MAX_HOST_NAME).unwrap();

        assert_eq!(name, "mail.example.test");
        assert_eq!(consumed, msg.len());
    }

    #[test]
    fn test_pointer_counts_two_bytes() {
        // "example.test" at 0, then "mail" + pointer to 0 at 14
        let mut msg = encoded("example.test");
        msg.extend_from_slice(&[4, b'm', b'a', b'i', b'l', 0xc0, 0x00]);

        let (name, consumed) = read_name(&msg, 14, MAX_HOST_NAME).unwrap();
        assert_eq!(name, "mail.example.test");
        assert_eq!(consumed, 5 + 2);
    }

    #[test]
    fn test_only_first_jump_is_counted() {
        // 0: "test"; 6: "example" -> ptr 0; 16: ptr 6
        let mut msg = encoded("test");
        msg.extend_from_slice(&[7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0xc0, 0x00]);
        msg.extend_from_slice(&[0xc0, 0x06]);

        let (name, consumed) = read_name(&msg, 16, 0).unwrap();
        assert_eq!(name, "example.test");
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_pointer_outside_message() {
        let msg = [0xc0, 0x40, 0x00];
        assert_eq!(read_name(&msg, 0, 0), Err(DnsError::BadNameRecord));

        let msg = [0xc0];
        assert_eq!(read_name(&msg, 0, 0), Err(DnsError::BadNameRecord));
    }

    #[test]
    fn test_label_running_past_end() {
        let msg = [5, b'a', b'b', b'c'];
        assert_eq!(read_name(&msg, 0, 0), Err(DnsError::BadNameRecord));
    }

    #[test]
    fn test_non_utf8_label_rejected() {
        let msg = [4, b'm', 0xff, b'i', b'l', 4, b't', b'e', b's', b't', 0];
        assert_eq!(read_name(&msg, 0, 0), Err(DnsError::BadNameRecord));
        assert_eq!(read_name(&msg, 5, 0).unwrap(), ("test".to_string(), 6));
    }

    #[test]
    fn test_text_capacity_enforced() {
        let msg = encoded("abcdefgh.ij");
        assert_eq!(read_name(&msg, 0, 10), Err(DnsError::BadNameRecord));
        assert_eq!(read_name(&msg, 0, 13), Err(DnsError::BadNameRecord));
        assert!(read_name(&msg, 0, 14).is_ok());
    }

    #[test]
    fn test_pointer_loop_rejected() {
        let msg = [0xc0, 0x00];
        assert_eq!(read_name(&msg, 0, 0), Err(DnsError::BadNameRecord));
    }

    #[test]
    fn test_root_name() {
        assert_eq!(encoded("."), vec![0]);
        assert_eq!(read_name(&[0], 0, 0).unwrap(), (String::new(), 1));
    }

    #[test]
    fn test_encode_rejects_long_label() {
        let name = format!("{}.test", "a".repeat(64));
        let mut out = vec![0xff];
        assert!(matches!(
            encode_name(&name, &mut out),
            Err(DnsError::InvalidName(_))
        ));
        assert_eq!(out, vec![0xff]);
    }
}
