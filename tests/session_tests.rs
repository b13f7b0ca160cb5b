//! # Session Tests
//!
//! End-to-end captures against a scripted ScopeMeter: the full transcript
//! the instrument would send is queued on a [`MockChannel`], the session
//! runs exactly as the CLI runs it, and the decoded screen is compared
//! against the picture the transcript was generated from.

use pretty_assertions::assert_eq;
use scopeshot::export::pbm;
use scopeshot::protocol::link::checksum;
use scopeshot::protocol::{Ack, ScopeMeter};
use scopeshot::raster::escape::ESC;
use scopeshot::raster::{Bitmap, Decoder};
use scopeshot::transport::MockChannel;
use scopeshot::{InstrumentConfig, ScopeshotError};

const ID_STRING: &str = "FLUKE 99; V01.10; 93-11-05";

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// The test picture: a diagonal plus a sparse lattice.
fn reference_pixel(x: usize, y: usize) -> bool {
    x == y || (x % 16 == 0 && y % 4 == 0)
}

fn reference_bitmap(width: usize, height: usize) -> Bitmap {
    let mut bitmap = Bitmap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if reference_pixel(x, y) {
                bitmap.set(x, y);
            }
        }
    }
    bitmap
}

/// Render the test picture as the printer job the instrument sends:
/// reset, setup, then one bit-image strip per 8 rows separated by CR LF.
fn screen_job(width: usize, height: usize) -> Vec<u8> {
    let mut job = vec![ESC, b'@', ESC, b'A', 8, ESC, b'M', ESC, b'k', 0];

    for top in (0..height).step_by(8) {
        let [lo, hi] = (width as u16).to_le_bytes();
        job.extend([ESC, b'*', 0x04, lo, hi]);

        for x in 0..width {
            let mut column = 0u8;
            for row in 0..8 {
                if reference_pixel(x, top + row) {
                    column |= 0x80 >> row;
                }
            }
            job.push(column);
        }

        job.extend(b"\r\n");
    }

    job
}

/// Everything the instrument sends during a grab: ID, IS and QG replies.
fn grab_transcript(job: &[u8]) -> Vec<u8> {
    let mut transcript = Vec::new();
    transcript.extend(format!("0\r{}\r", ID_STRING).as_bytes());
    transcript.extend(b"0\r0\r");
    transcript.extend(format!("0\r{},", job.len()).as_bytes());
    transcript.extend_from_slice(job);
    transcript.push(checksum(job));
    transcript
}

fn scope(transcript: &[u8]) -> ScopeMeter<MockChannel> {
    ScopeMeter::new(
        MockChannel::new(transcript),
        &InstrumentConfig::SCOPEMETER_99,
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn full_grab_reproduces_screen() {
    let job = screen_job(240, 240);
    let mut scope = scope(&grab_transcript(&job));

    let id = scope.identify().unwrap();
    assert_eq!(id.payload.as_deref(), Some(ID_STRING));

    let status = scope.instrument_status().unwrap();
    assert_eq!(status.payload.map(|s| s.value), Some(0));

    let reply = scope.query_graphics(129).unwrap();
    let block = reply.payload.expect("graphics payload");
    assert!(block.is_valid());
    assert_eq!(block.data, job);

    let (bitmap, report) = Decoder::default().decode_with_report(&block.data);
    assert_eq!(report.strips, 30);
    assert_eq!(report.cursor, 240);
    assert_eq!(report.dropped_pixels, 0);
    assert_eq!(report.truncated_at, None);
    assert_eq!(bitmap, reference_bitmap(240, 240));

    let channel = scope.into_inner();
    assert_eq!(channel.written(), b"ID\rIS\rQG129\r");
    assert_eq!(channel.remaining(), 0);
}

#[test]
fn pbm_output_matches_reference_rows() {
    let job = screen_job(240, 240);
    let bitmap = Decoder::default().decode(&job);

    let file = pbm::encode(&bitmap, "scopeshot");
    let header = b"P4\n# CREATOR: scopeshot\n240 240\n";
    assert_eq!(&file[..header.len()], &header[..]);
    assert_eq!(&file[header.len()..], reference_bitmap(240, 240).as_bytes());
}

#[test]
fn checksum_mismatch_still_decodes() {
    let job = screen_job(240, 240);
    let mut transcript = grab_transcript(&job);
    // Flip one bit of a data byte in the middle of the block
    let middle = transcript.len() - job.len() / 2;
    transcript[middle] ^= 0x01;

    let mut scope = scope(&transcript);
    scope.identify().unwrap();
    scope.instrument_status().unwrap();
    let block = scope.query_graphics(129).unwrap().payload.unwrap();

    assert!(!block.is_valid());
    assert_eq!(block.len(), job.len());

    // Still a full-size picture, differing from the reference only slightly
    let bitmap = Decoder::default().decode(&block.data);
    let reference = reference_bitmap(240, 240);
    let differing = bitmap
        .as_bytes()
        .iter()
        .zip(reference.as_bytes())
        .filter(|(a, b)| a != b)
        .count();
    assert!(differing <= 1);
}

#[test]
fn rejected_graphics_query_yields_ack_only() {
    let mut transcript = format!("0\r{}\r", ID_STRING).into_bytes();
    transcript.extend(b"0\r0\r");
    transcript.extend(b"1\r");

    let mut scope = scope(&transcript);
    scope.identify().unwrap();
    scope.instrument_status().unwrap();
    let reply = scope.query_graphics(999).unwrap();

    assert_eq!(reply.ack, Ack::SyntaxError);
    assert_eq!(reply.ack_text, "1");
    assert!(reply.payload.is_none());
}

#[test]
fn link_drop_mid_payload_is_fatal() {
    let job = screen_job(240, 240);
    let transcript = grab_transcript(&job);
    // The instrument stops talking halfway through the block
    let cut = transcript.len() - job.len() / 2;

    let mut scope = scope(&transcript[..cut]);
    scope.identify().unwrap();
    scope.instrument_status().unwrap();

    assert!(matches!(
        scope.query_graphics(129),
        Err(ScopeshotError::Timeout { .. })
    ));
}

#[test]
fn truncated_dump_decodes_partially() {
    let job = screen_job(240, 240);
    // A dump cut off in the middle of strip 10's columns
    let strip_len = 5 + 240 + 2;
    let cut = 10 + strip_len * 10 + 5 + 100;

    let (bitmap, report) = Decoder::default().decode_with_report(&job[..cut]);
    assert_eq!(report.strips, 11);
    assert_eq!(report.truncated_at, Some(10 + strip_len * 10));

    let reference = reference_bitmap(240, 240);
    for y in 0..240 {
        for x in 0..240 {
            let expected = reference.get(x, y) && (y < 80 || (y < 88 && x < 100));
            assert_eq!(bitmap.get(x, y), expected, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn smaller_screen_from_config() {
    let config = InstrumentConfig::from_json(r#"{ "width": 64, "height": 32 }"#).unwrap();
    let job = screen_job(64, 32);

    let bitmap = Decoder::for_screen(&config).decode(&job);
    assert_eq!(bitmap, reference_bitmap(64, 32));
}
