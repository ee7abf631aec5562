use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "att-dtmf-test")]
#[command(
    about = "Place a collect call through AT&T USADirect using DTMF tone audio and record it",
    long_about = None
)]
pub struct AttDtmfCli {
    #[arg(short, long)]
    pub verbose: bool,

    /// Destination number; a leading + or 82 country code is accepted
    pub phone: Option<String>,

    /// URL of the DTMF tone audio to play
    pub audio_url: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "dtmf-playback-test")]
#[command(
    about = "Call a phone and play DTMF tone audio to check it survives the line",
    long_about = None
)]
pub struct PlaybackCli {
    #[arg(short, long)]
    pub verbose: bool,

    /// Number to call, e.g. +821033650654
    pub phone: Option<String>,

    /// URL of the DTMF tone audio to play
    pub audio_url: Option<String>,
}
