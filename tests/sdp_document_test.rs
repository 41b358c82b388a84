//! SDP document integration tests
//!
//! Parse browser-generated descriptions and check that the document model
//! keeps everything needed to write them back out.

use roap::domain::sdp::lines::{Line, MediaDirection, RidDirection, SetupRole};
use roap::domain::sdp::{Document, Grammar, MediaType, DEFAULT_GRAMMAR};
use roap::SdpError;

const BROWSER_OFFER: &str = "v=0\r\n\
o=- 8085441536212372428 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0 1 2\r\n\
a=extmap-allow-mixed\r\n\
a=msid-semantic: WMS stream\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111 63 9 0 8\r\n\
c=IN IP4 0.0.0.0\r\n\
a=rtcp:9 IN IP4 0.0.0.0\r\n\
a=candidate:842163049 1 udp 1677729535 203.0.113.7 61842 typ srflx raddr 192.168.1.20 rport 61842 generation 0 network-cost 999\r\n\
a=candidate:3061385702 1 udp 2122260223 192.168.1.20 61842 typ host generation 0\r\n\
a=ice-ufrag:Kb1+\r\n\
a=ice-pwd:WcMhnvQ6Mf9eLxbSh5bQ0Ij4\r\n\
a=ice-options:trickle\r\n\
a=fingerprint:sha-256 2E:56:4B:1F:2D:AB:8C:0E:39:12:4A:6F:75:A4:91:0C\r\n\
a=setup:actpass\r\n\
a=mid:0\r\n\
a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n\
a=sendrecv\r\n\
a=msid:stream audio-track\r\n\
a=rtcp-mux\r\n\
a=rtpmap:111 opus/48000/2\r\n\
a=rtcp-fb:111 transport-cc\r\n\
a=fmtp:111 minptime=10;useinbandfec=1\r\n\
a=rtpmap:63 red/48000/2\r\n\
a=fmtp:63 111/111\r\n\
a=rtpmap:9 G722/8000\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=rtpmap:8 PCMA/8000\r\n\
a=ssrc:1001 cname:abc\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96 97 102 103\r\n\
c=IN IP4 0.0.0.0\r\n\
a=ice-ufrag:Kb1+\r\n\
a=ice-pwd:WcMhnvQ6Mf9eLxbSh5bQ0Ij4\r\n\
a=setup:actpass\r\n\
a=mid:1\r\n\
a=extmap:4/sendonly urn:3gpp:video-orientation\r\n\
a=recvonly\r\n\
a=rtcp-mux\r\n\
a=rtcp-rsize\r\n\
a=rtpmap:96 VP8/90000\r\n\
a=rtcp-fb:96 goog-remb\r\n\
a=rtcp-fb:96 nack\r\n\
a=rtcp-fb:96 nack pli\r\n\
a=rtpmap:97 rtx/90000\r\n\
a=fmtp:97 apt=96\r\n\
a=rtpmap:102 H264/90000\r\n\
a=fmtp:102 level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f\r\n\
a=rtpmap:103 rtx/90000\r\n\
a=fmtp:103 apt=102\r\n\
a=rid:hi send\r\n\
a=rid:lo send max-width=640;max-height=360\r\n\
a=simulcast:send hi;~lo\r\n\
m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
c=IN IP4 0.0.0.0\r\n\
a=ice-ufrag:Kb1+\r\n\
a=ice-pwd:WcMhnvQ6Mf9eLxbSh5bQ0Ij4\r\n\
a=setup:actpass\r\n\
a=mid:2\r\n\
a=sctp-port:5000\r\n\
a=max-message-size:262144\r\n";

#[test]
fn test_parse_browser_offer() {
    let doc = Document::parse(BROWSER_OFFER).unwrap();

    assert_eq!(doc.session.version.as_ref().unwrap().version, 0);
    assert_eq!(
        doc.session.origin.as_ref().unwrap().session_id,
        "8085441536212372428"
    );
    assert_eq!(doc.session.bundle_groups[0].mids, vec!["0", "1", "2"]);
    assert_eq!(doc.session.other_lines.len(), 2);
    assert_eq!(doc.media.len(), 3);

    let audio = &doc.media[0];
    assert_eq!(audio.media_type, MediaType::Audio);
    assert_eq!(audio.mid.as_deref(), Some("0"));
    assert_eq!(audio.setup, Some(SetupRole::Actpass));
    assert_eq!(audio.direction, Some(MediaDirection::SendRecv));
    assert!(audio.rtcp_mux);
    assert_eq!(audio.ice.ufrag.as_deref(), Some("Kb1+"));
    assert_eq!(audio.ice.candidates.len(), 2);

    let srflx = &audio.ice.candidates[0];
    assert_eq!(srflx.candidate_type, "srflx");
    assert_eq!(srflx.related_address.as_deref(), Some("192.168.1.20"));
    assert_eq!(srflx.related_port, Some(61842));
    assert_eq!(
        srflx.extensions,
        vec![
            ("generation".to_string(), "0".to_string()),
            ("network-cost".to_string(), "999".to_string())
        ]
    );

    let rtp = audio.rtp().unwrap();
    assert_eq!(rtp.payload_types, vec![111, 63, 9, 0, 8]);
    let opus = rtp.codec(111).unwrap();
    assert!(opus.is_named("OPUS"));
    assert_eq!(opus.clock_rate, Some(48000));
    assert_eq!(opus.encoding_params, Some(2));
    assert_eq!(opus.feedback, vec!["transport-cc"]);
    assert_eq!(rtp.codec(63).unwrap().primary_payload_type(), Some(111));
}

#[test]
fn test_video_codecs_and_simulcast() {
    let doc = Document::parse(BROWSER_OFFER).unwrap();
    let video = doc.media_of_type(MediaType::Video).next().unwrap();

    assert_eq!(video.direction, Some(MediaDirection::RecvOnly));
    assert_eq!(video.extmaps[0].direction, Some(MediaDirection::SendOnly));

    let rtp = video.rtp().unwrap();
    assert!(rtp.has_codec("h264"));
    assert_eq!(rtp.codec(96).unwrap().feedback.len(), 3);
    assert_eq!(rtp.codec(97).unwrap().primary_payload_type(), Some(96));
    assert_eq!(rtp.codec(103).unwrap().primary_payload_type(), Some(102));
    assert_eq!(
        rtp.codec(102).unwrap().fmtp.get("profile-level-id"),
        Some("42001f")
    );
    assert_eq!(rtp.codecs_named("rtx").count(), 2);

    assert_eq!(video.rids.len(), 2);
    assert_eq!(video.rids[1].direction, RidDirection::Send);
    assert_eq!(
        video.rids[1].restrictions.as_deref(),
        Some("max-width=640;max-height=360")
    );
    let simulcast = video.simulcast.as_ref().unwrap();
    assert_eq!(simulcast.sets[0].streams.len(), 2);
    assert!(simulcast.sets[0].streams[1][0].paused);

    // attributes without a typed parser are kept with their block
    assert!(video
        .other_lines
        .iter()
        .any(|l| matches!(l, Line::Unknown(u) if u.raw == "a=rtcp-rsize")));
}

#[test]
fn test_application_block() {
    let doc = Document::parse(BROWSER_OFFER).unwrap();
    let data = doc.media_of_type(MediaType::Application).next().unwrap();

    assert!(data.rtp().is_none());
    let application = data.application().unwrap();
    assert_eq!(application.formats, vec!["webrtc-datachannel"]);
    assert_eq!(application.sctp_port, Some(5000));
    assert_eq!(application.max_message_size, Some(262144));
    assert_eq!(doc.rtp_media().count(), 2);
}

#[test]
fn test_serialization_is_stable() {
    let doc = Document::parse(BROWSER_OFFER).unwrap();
    let first = doc.to_sdp_string();
    let reparsed = Document::parse(&first).unwrap();

    assert_eq!(reparsed, doc);
    assert_eq!(reparsed.to_sdp_string(), first);
    assert!(first.ends_with("\r\n"));
    assert_eq!(first.lines().count(), BROWSER_OFFER.lines().count());
}

#[test]
fn test_unknown_lines_survive_serialization() {
    let serialized = Document::parse(BROWSER_OFFER).unwrap().to_sdp_string();

    for raw in [
        "a=extmap-allow-mixed",
        "a=msid-semantic: WMS stream",
        "a=rtcp:9 IN IP4 0.0.0.0",
        "a=msid:stream audio-track",
        "a=ssrc:1001 cname:abc",
        "a=rtcp-rsize",
    ] {
        assert!(serialized.contains(raw), "missing {}", raw);
    }
}

#[test]
fn test_lf_only_input() {
    let lf = BROWSER_OFFER.replace("\r\n", "\n");
    assert_eq!(
        Document::parse(&lf).unwrap(),
        Document::parse(BROWSER_OFFER).unwrap()
    );
}

#[test]
fn test_malformed_numeric_fields_are_kept_verbatim() {
    let text = "v=0\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
a=rtpmap:96 VP8/ninety\r\n\
a=max-message-size:lots\r\n";
    let doc = Document::parse(text).unwrap();
    let video = &doc.media[0];

    assert_eq!(video.rtp().unwrap().codec(96).unwrap().name, None);
    assert_eq!(video.other_lines.len(), 2);
    assert!(doc.to_sdp_string().contains("a=rtpmap:96 VP8/ninety\r\n"));
}

#[test]
fn test_custom_grammar() {
    let grammar = Grammar::new();
    let doc = Document::parse_with_grammar("v=0\r\nx=custom\r\n", &grammar).unwrap();

    assert!(doc.session.version.is_none());
    assert_eq!(doc.session.other_lines.len(), 2);
    assert_eq!(doc.to_sdp_string(), "v=0\r\nx=custom\r\n");

    assert!(matches!(
        DEFAULT_GRAMMAR.parse_raw_line("v=0"),
        Some(Line::Version(_))
    ));
}

#[test]
fn test_unsupported_media() {
    assert_eq!(
        Document::parse("v=0\r\nm=text 9 RTP/AVP 98\r\n"),
        Err(SdpError::UnsupportedMediaType("text".to_string()))
    );
}

#[test]
fn test_repeated_payload_type_round_trips() {
    let text = "v=0\r\nm=audio 9 RTP/AVP 0 0\r\na=rtpmap:0 PCMU/8000\r\n";
    let doc = Document::parse(text).unwrap();
    let serialized = doc.to_sdp_string();

    assert_eq!(serialized, "v=0\r\nm=audio 9 RTP/AVP 0\r\na=rtpmap:0 PCMU/8000\r\n");
    let again = Document::parse(&serialized).unwrap();
    assert_eq!(again, doc);
    assert_eq!(again.to_sdp_string(), serialized);
}

#[test]
fn test_media_line_with_port_count_keeps_following_attributes() {
    let text = "v=0\r\n\
s=-\r\n\
m=audio 9 RTP/AVP 0\r\n\
a=rtpmap:0 PCMU/8000\r\n\
m=video 9/2 RTP/AVP 96\r\n\
a=rtpmap:96 VP8/90000\r\n\
a=mid:v\r\n";
    let doc = Document::parse(text).unwrap();

    assert_eq!(doc.media.len(), 2);
    assert!(doc.media[0].other_lines.is_empty());
    assert_eq!(doc.media[1].mid.as_deref(), Some("v"));
    assert!(doc.to_sdp_string().ends_with("m=video 9/2 RTP/AVP 96\r\na=mid:v\r\na=rtpmap:96 VP8/90000\r\n"));

    assert!(matches!(
        Document::parse("v=0\r\nm=video 65536 RTP/AVP 96\r\n"),
        Err(SdpError::InvalidMediaLine(_))
    ));
}
