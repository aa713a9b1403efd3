/// Machine word size of the target in bytes.
///
/// The `@N` decoration suffix is the number of argument bytes the callee pops,
/// every argument occupies at least one word on 32-bit x86.
pub const WORD_SIZE: u32 = 4;

/// Calling convention recovered from a name decoration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    /// `_Name`. Also used for data exports.
    #[default]
    Cdecl,

    /// `_Name@N`
    Stdcall,

    /// `@Name@N`
    Fastcall,
}

impl CallingConvention {
    /// Returns the MSVC keyword for the calling convention.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Cdecl => "__cdecl",
            Self::Stdcall => "__stdcall",
            Self::Fastcall => "__fastcall",
        }
    }

    /// Returns the calling convention for a sized decoration prefix character.
    ///
    /// `@` is fastcall, everything else is treated as stdcall.
    pub(crate) fn from_sized_prefix(prefix: char) -> CallingConvention {
        if prefix == '@' {
            Self::Fastcall
        } else {
            Self::Stdcall
        }
    }
}

impl std::fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What an export resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// The export has an implementation inside the library.
    Function {
        calling_convention: CallingConvention,

        /// Number of word sized parameters. Always 0 for cdecl.
        parameters: u32,
    },

    /// The export redirects to another library's export.
    Forward {
        /// Library to link against for the export.
        library: String,

        /// Export name (or `#ordinal`) in `library`.
        function: String,
    },
}

/// One row of the export table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportRecord {
    pub(crate) ordinal: u32,
    pub(crate) hint: Option<u16>,
    pub(crate) rva: Option<u32>,
    pub(crate) name: String,
    pub(crate) extern_c: bool,
    pub(crate) no_name: bool,
    pub(crate) intrinsic: bool,
    pub(crate) kind: ExportKind,
}

impl ExportRecord {
    /// Creates a record for a function or data export.
    ///
    /// The intrinsic flag is derived from `name`.
    pub fn function(
        ordinal: u32,
        name: impl Into<String>,
        calling_convention: CallingConvention,
        parameters: u32,
    ) -> ExportRecord {
        let parameters = match calling_convention {
            CallingConvention::Cdecl => 0,
            _ => parameters,
        };

        Self::new(
            ordinal,
            name.into(),
            ExportKind::Function {
                calling_convention,
                parameters,
            },
        )
    }

    /// Creates a record for a forwarded export.
    pub fn forward(
        ordinal: u32,
        name: impl Into<String>,
        library: impl Into<String>,
        function: impl Into<String>,
    ) -> ExportRecord {
        Self::new(
            ordinal,
            name.into(),
            ExportKind::Forward {
                library: library.into(),
                function: function.into(),
            },
        )
    }

    fn new(ordinal: u32, name: String, kind: ExportKind) -> ExportRecord {
        Self {
            ordinal,
            hint: None,
            rva: None,
            intrinsic: crate::intrinsics::is_intrinsic(&name),
            name,
            extern_c: true,
            no_name: false,
            kind,
        }
    }

    /// Marks the export as only being reachable by ordinal.
    pub fn with_no_name(mut self, no_name: bool) -> ExportRecord {
        self.no_name = no_name;
        self
    }

    /// Sets the hint and RVA columns from the listing row.
    pub fn with_location(mut self, hint: Option<u16>, rva: Option<u32>) -> ExportRecord {
        self.hint = hint;
        self.rva = rva;
        self
    }

    /// Sets whether the export needs C linkage.
    pub fn with_extern_c(mut self, extern_c: bool) -> ExportRecord {
        self.extern_c = extern_c;
        self
    }

    /// Ordinal from the source export table.
    #[inline]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Name hint column. Not present for NONAME exports.
    #[inline]
    pub fn hint(&self) -> Option<u16> {
        self.hint
    }

    /// Relative virtual address. Not present for forwarded exports.
    #[inline]
    pub fn rva(&self) -> Option<u32> {
        self.rva
    }

    /// Undecorated public name of the export.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_extern_c(&self) -> bool {
        self.extern_c
    }

    #[inline]
    pub fn is_no_name(&self) -> bool {
        self.no_name
    }

    /// Returns `true` if the name collides with a reserved identifier and
    /// needs to be declared under a different name.
    #[inline]
    pub fn is_intrinsic(&self) -> bool {
        self.intrinsic
    }

    #[inline]
    pub fn is_forward_export(&self) -> bool {
        matches!(self.kind, ExportKind::Forward { .. })
    }

    #[inline]
    pub fn kind(&self) -> &ExportKind {
        &self.kind
    }

    /// Calling convention of the export.
    ///
    /// Forwarded exports report [`CallingConvention::Cdecl`].
    pub fn calling_convention(&self) -> CallingConvention {
        match self.kind {
            ExportKind::Function {
                calling_convention, ..
            } => calling_convention,
            ExportKind::Forward { .. } => CallingConvention::Cdecl,
        }
    }

    /// Number of word sized parameters.
    pub fn parameter_count(&self) -> u32 {
        match self.kind {
            ExportKind::Function { parameters, .. } => parameters,
            ExportKind::Forward { .. } => 0,
        }
    }

    /// Returns the `(library, function)` forward destination if this is a
    /// forwarded export.
    pub fn forward_target(&self) -> Option<(&str, &str)> {
        match &self.kind {
            ExportKind::Forward { library, function } => Some((library, function)),
            ExportKind::Function { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CallingConvention, ExportRecord};

    #[test]
    fn cdecl_drops_parameters() {
        let record = ExportRecord::function(1, "wcstoul", CallingConvention::Cdecl, 3);
        assert_eq!(record.parameter_count(), 0);
    }

    #[test]
    fn intrinsic_derived_from_name() {
        let record = ExportRecord::function(7, "_purecall", CallingConvention::Cdecl, 0);
        assert!(record.is_intrinsic());

        let record = ExportRecord::forward(8, "atexit", "msvcrt", "atexit");
        assert!(record.is_intrinsic());
        assert!(record.is_forward_export());
    }

    #[test]
    fn forward_accessors() {
        let record = ExportRecord::forward(3, "ZwClose", "NTDLL", "NtClose");
        assert_eq!(record.forward_target(), Some(("NTDLL", "NtClose")));
        assert_eq!(record.calling_convention(), CallingConvention::Cdecl);
        assert_eq!(record.parameter_count(), 0);
        assert!(!record.is_no_name());
        assert!(record.is_extern_c());
    }
}
