//! TwiML call-control documents for the two test calls.
//!
//! Values are interpolated into the markup verbatim. Nothing is escaped or
//! validated, so callers must pass strings that are already safe to embed in
//! XML text and attribute positions (phone numbers, plain URLs, prompt text
//! without `<` or `&`). Building a document never fails.

use crate::phone::KOREA_COUNTRY_CODE;

/// AT&T international collect-call access number (1-800-822-8256).
pub const ATT_COLLECT_ACCESS_NUMBER: &str = "+18008228256";

/// Public touch-tone sample for key 4.
pub const DEFAULT_TONE_URL: &str =
    "https://raw.githubusercontent.com/Twilio-org/sound-sets/master/touch-tones/key4.mp3";

const VOICE: &str = "woman";

/// Dials the collect-call service, selects the menu entry with the tone
/// audio, keys in the destination and records whatever answers.
///
/// `dial` is the destination without its trunk zero; it is spoken and then
/// entered as `82{dial}#`.
pub fn collect_call_document(access_number: &str, audio_url: &str, dial: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Dial timeout="8">{access_number}</Dial>

    <Play>{audio_url}</Play>
    <Pause length="2"/>
    <Play>{audio_url}</Play>

    <Pause length="10"/>

    <Say voice="{VOICE}" language="en-US">Now entering the phone number with country code: {cc} {dial}</Say>
    <Pause length="5"/>
    <Play digits="{cc}{dial}#"/>
    <Pause length="15"/>

    <Say voice="{VOICE}" language="en-US">Waiting for connection. Recording for analysis.</Say>
    <Record timeout="180" playBeep="false"/>
    <Say voice="{VOICE}" language="en-US">Test completed. Hanging up now.</Say>
</Response>"#,
        cc = KOREA_COUNTRY_CODE,
    )
}

/// Spoken text for the playback test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    /// BCP-47 tag handed to the speech synthesizer.
    pub language: String,
    pub greeting: String,
    pub announce_audio: String,
    pub rounds: [String; 3],
    pub announce_builtin: String,
    pub farewell: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            language: "ko-KR".to_string(),
            greeting: "안녕하세요, DTMF 오디오 재생 테스트를 시작합니다.".to_string(),
            announce_audio: "이제 DTMF 4번 오디오 파일을 재생합니다.".to_string(),
            rounds: [
                "1번째 재생".to_string(),
                "2번째 재생".to_string(),
                "3번째 재생, 볼륨 주의".to_string(),
            ],
            announce_builtin: "이어서 Twilio의 기본 DTMF 4번 톤을 재생합니다.".to_string(),
            farewell: "테스트가 완료되었습니다. 감사합니다.".to_string(),
        }
    }
}

/// Plays the tone audio five times over three announced rounds, then the
/// provider's own synthesized `4` tones, so both can be compared by ear.
pub fn playback_document(audio_url: &str, prompts: &Prompts) -> String {
    let lang = &prompts.language;
    let [round1, round2, round3] = &prompts.rounds;

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Say voice="{VOICE}" language="{lang}">{greeting}</Say>
    <Pause length="1"/>

    <Say voice="{VOICE}" language="{lang}">{announce_audio}</Say>
    <Pause length="1"/>

    <Say voice="{VOICE}" language="{lang}">{round1}</Say>
    <Play>{audio_url}</Play>
    <Pause length="1"/>

    <Say voice="{VOICE}" language="{lang}">{round2}</Say>
    <Play>{audio_url}</Play>
    <Pause length="1"/>

    <Say voice="{VOICE}" language="{lang}">{round3}</Say>
    <Play>{audio_url}</Play>
    <Play>{audio_url}</Play>
    <Play>{audio_url}</Play>
    <Pause length="1"/>

    <Say voice="{VOICE}" language="{lang}">{announce_builtin}</Say>
    <Play digits="4"/>
    <Pause length="1"/>
    <Play digits="4"/>
    <Pause length="1"/>
    <Play digits="444"/>

    <Say voice="{VOICE}" language="{lang}">{farewell}</Say>
</Response>"#,
        greeting = prompts.greeting,
        announce_audio = prompts.announce_audio,
        announce_builtin = prompts.announce_builtin,
        farewell = prompts.farewell,
    )
}
