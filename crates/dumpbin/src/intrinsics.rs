/// Names MSVC refuses as ordinary declarations.
///
/// Sorted for [`slice::binary_search`].
const INTRINSICS: [&str; 15] = [
    "_CxxThrowException",
    "__CxxDetectRethrow",
    "__CxxExceptionFilter",
    "__CxxQueryExceptionSize",
    "__CxxRegisterExceptionObject",
    "__CxxUnregisterExceptionObject",
    "__RTCastToVoid",
    "__RTDynamicCast",
    "__RTtypeid",
    "__std_terminate",
    "_abnormal_termination",
    "_purecall",
    "_setjmp",
    "_setjmpex",
    "atexit",
];

/// Returns `true` if `name` collides with a compiler or runtime reserved
/// identifier.
pub fn is_intrinsic(name: &str) -> bool {
    INTRINSICS.binary_search(&name).is_ok()
}
