use assert_cmd::cargo::cargo_bin_cmd;

use crate::utils::testfs::TestFs;

mod utils;

const NTDLL_EXPORTS: &str = include_str!("data/ntdll-exports.txt");

const NTDLL_STUBS: &str = "\
extern \"C\" int __stdcall AlpcGetMessageAttribute(int, int) { return 8; }
extern \"C\" int __cdecl _INTRINSIC__purecall() { return 10; }
extern \"C\" int __cdecl wcstoul() { return 12; }
extern \"C\" int __fastcall RtlpWaitForCriticalSection(int) { return 13; }
extern \"C\" int __stdcall RtlpHiddenExport(int, int, int) { return 14; }
";

const NTDLL_DEF: &str = "\
LIBRARY ntdll.dll
EXPORTS
\tAlpcGetMessageAttribute
\tZwCreateUserProcess = NTDLL.NtCreateUserProcess
\t_purecall = _INTRINSIC__purecall
\tmemmove = ucrtbase.memmove
\twcstoul
\tRtlpWaitForCriticalSection
\tRtlpHiddenExport @14 NONAME
";

/// Listing of a DLL without an export table.
const EMPTY_LISTING: &str = "\
Microsoft (R) COFF/PE Dumper Version 14.16.27045.0
Copyright (C) Microsoft Corporation.  All rights reserved.


Dump of file C:\\Windows\\System32\\empty.dll

File Type: DLL

  Summary

        1000 .data
        1000 .pdata
        1000 .rdata
        1000 .reloc
        1000 .rsrc
        1000 .text
";

#[test]
fn generate_artifacts() {
    let fs = TestFs::new("generate_artifacts").unwrap();
    fs.write("ntdll-exports.txt", NTDLL_EXPORTS).unwrap();

    cargo_bin_cmd!()
        .arg(fs.join_path("ntdll-exports.txt"))
        .arg("ntdll.dll")
        .arg("--color-diagnostics=never")
        .assert()
        .success();

    assert_eq!(fs.read_to_string("ntdll-exports.cpp").unwrap(), NTDLL_STUBS);
    assert_eq!(fs.read_to_string("ntdll-exports.def").unwrap(), NTDLL_DEF);

    let script = fs.read_to_string("ntdll-exports.bat").unwrap();
    let lines = script.split("\r\n").collect::<Vec<_>>();
    assert!(lines.contains(&format!("set WORKDIR={}", fs.root().display()).as_str()));
    assert!(lines.contains(&"set CFILE=ntdll-exports.cpp"));
    assert!(lines.contains(&"set DEFFILE=ntdll-exports.def"));
    assert!(lines.contains(&r#"set LIBS="ntdll.lib" "ucrt.lib" "#));
    assert!(lines.contains(&"set OUTPUTFILE=ntdll.dll"));
}

#[test]
fn output_dir() {
    let fs = TestFs::new("output_dir").unwrap();
    fs.write("ntdll-exports.txt", NTDLL_EXPORTS).unwrap();

    cargo_bin_cmd!()
        .arg("-o")
        .arg(fs.join_path("generated"))
        .arg(fs.join_path("ntdll-exports.txt"))
        .arg("ntdll.dll")
        .arg("--vcvars=D:\\vs\\vcvars32.bat")
        .assert()
        .success();

    assert!(!fs.exists("ntdll-exports.cpp"));
    assert_eq!(
        fs.read_to_string("generated/ntdll-exports.def").unwrap(),
        NTDLL_DEF
    );

    let script = fs.read_to_string("generated/ntdll-exports.bat").unwrap();
    assert!(script.contains("set VCVARSFILE=D:\\vs\\vcvars32.bat\r\n"));
    assert!(script.contains(&format!(
        "set WORKDIR={}\r\n",
        fs.join_path("generated").display()
    )));
}

#[test]
fn response_file() {
    let fs = TestFs::new("response_file").unwrap();
    fs.write("ntdll-exports.txt", NTDLL_EXPORTS).unwrap();
    fs.write(
        "args.rsp",
        format!(
            "{}\nntdll.dll\n--preamble-lines=19\n",
            fs.join_path("ntdll-exports.txt").display()
        ),
    )
    .unwrap();

    cargo_bin_cmd!()
        .arg(format!("@{}", fs.join_path("args.rsp").display()))
        .assert()
        .success();

    assert_eq!(fs.read_to_string("ntdll-exports.cpp").unwrap(), NTDLL_STUBS);
}

#[test]
fn no_exports() {
    let fs = TestFs::new("no_exports").unwrap();
    fs.write("empty.txt", EMPTY_LISTING).unwrap();

    let output = cargo_bin_cmd!()
        .arg(fs.join_path("empty.txt"))
        .arg("empty.dll")
        .assert()
        .code(2)
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no exports found"),
        "stderr should report the missing exports:\n{stderr}"
    );

    assert!(!fs.exists("empty.cpp"));
    assert!(!fs.exists("empty.def"));
    assert!(!fs.exists("empty.bat"));
}

#[test]
fn missing_listing() {
    let fs = TestFs::new("missing_listing").unwrap();

    let output = cargo_bin_cmd!()
        .arg(fs.join_path("missing.txt"))
        .arg("missing.dll")
        .assert()
        .code(1)
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to open") && stderr.contains("for reading"),
        "stderr should report the unreadable listing:\n{stderr}"
    );
}

#[test]
fn usage_without_arguments() {
    let output = cargo_bin_cmd!().assert().success().get_output().clone();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<LISTING>"), "usage should name the listing:\n{stdout}");
    assert!(
        stdout.contains("dumpbin /EXPORTS file.dll > <LISTING>"),
        "usage should explain how to create the listing:\n{stdout}"
    );
}

#[test]
fn missing_dllname() {
    cargo_bin_cmd!()
        .arg("ntdll-exports.txt")
        .assert()
        .failure();
}
