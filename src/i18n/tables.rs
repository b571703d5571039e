//! Message templates per locale

use super::{Locale, MessageKind};

pub(super) fn lookup(locale: Locale, kind: MessageKind) -> &'static str {
    match locale {
        Locale::English => english(kind),
        Locale::German => german(kind),
    }
}

fn english(kind: MessageKind) -> &'static str {
    use MessageKind::*;
    match kind {
        UnknownArgument => "unknown argument '{key}'",
        UnexpectedPositional => "unexpected positional value '{value}'",
        InvalidAssignment => "argument '{key}' does not take a value (got '{value}')",
        AssignmentFailed => "cannot assign '{value}' to '{key}': {reason}",
        MissingAssignment => "argument '{key}' requires a value",
        MissingListAssignment => "argument '{key}' expects {expected} value(s), found {found}",
        TooManyAssignment => "argument '{key}' accepts at most {expected} value(s), found {found}",
        MissingArgument => "required argument '{name}' is missing",
        NotListType => "argument '{key}' does not hold a list",
        HelpRequested => "help requested",
        HelpDisplayed => "parser failed, help displayed",
        InvalidInput => "invalid input",
        BoundaryLow => "value is below the minimum",
        BoundaryHigh => "value is above the maximum",
        ErrorPrefix => "error",
        UsagePrefix => "usage:",
        PositionalHeading => "positional arguments:",
        OptionsHeading => "options:",
        HelpFlagHelp => "show this help message and exit",
        OptionsPlaceholder => "[options]",
    }
}

fn german(kind: MessageKind) -> &'static str {
    use MessageKind::*;
    match kind {
        UnknownArgument => "unbekanntes Argument '{key}'",
        UnexpectedPositional => "unerwarteter Positionswert '{value}'",
        InvalidAssignment => "Argument '{key}' nimmt keinen Wert an (erhalten: '{value}')",
        AssignmentFailed => "'{value}' kann '{key}' nicht zugewiesen werden: {reason}",
        MissingAssignment => "Argument '{key}' benötigt einen Wert",
        MissingListAssignment => "Argument '{key}' erwartet {expected} Wert(e), gefunden {found}",
        TooManyAssignment => "Argument '{key}' erlaubt höchstens {expected} Wert(e), gefunden {found}",
        MissingArgument => "erforderliches Argument '{name}' fehlt",
        NotListType => "Argument '{key}' ist keine Liste",
        HelpRequested => "Hilfe angefordert",
        HelpDisplayed => "Parser fehlgeschlagen, Hilfe angezeigt",
        InvalidInput => "ungültige Eingabe",
        BoundaryLow => "Wert liegt unter dem Minimum",
        BoundaryHigh => "Wert liegt über dem Maximum",
        ErrorPrefix => "Fehler",
        UsagePrefix => "Aufruf:",
        PositionalHeading => "Positionsargumente:",
        OptionsHeading => "Optionen:",
        HelpFlagHelp => "diese Hilfe anzeigen und beenden",
        OptionsPlaceholder => "[Optionen]",
    }
}
