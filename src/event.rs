use crate::{ContainerStyle, Mark, ScalarStyle, TagDirective, VersionDirective};

/// One parsing event.
///
/// Events are internal plumbing between the parser state machine and the
/// tree composer; the crate deliberately exposes no streaming surface.
#[derive(Debug, PartialEq, Default)]
pub(crate) struct Event {
    pub data: EventData,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

#[derive(Debug, PartialEq, Default)]
pub(crate) enum EventData {
    #[default]
    StreamStart,
    StreamEnd,
    DocumentStart {
        version_directive: Option<VersionDirective>,
        tag_directives: Vec<TagDirective>,
        implicit: bool,
    },
    DocumentEnd {
        implicit: bool,
    },
    Alias {
        anchor: String,
    },
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        value: String,
        style: ScalarStyle,
    },
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: ContainerStyle,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: ContainerStyle,
    },
    MappingEnd,
}
