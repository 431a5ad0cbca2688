//! 파일 시스템 추상화 모듈
//!
//! 병합/저장 로직이 실제 디스크에 직접 의존하지 않도록
//! 폴더 나열, 파일 읽기/쓰기, 폴더 생성을 트레이트로 분리합니다.

use memmap2::Mmap;
use std::cell::{RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 메모리 매핑으로 읽기 시작하는 기본 파일 크기 (10MB)
pub const DEFAULT_MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

/// 파일 시스템 작업 트레이트
///
/// # Examples
/// ```
/// use jmerge::fs::{FileSystem, MemoryFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new();
/// fs.add_file("root/u1/bp.json", "[]");
///
/// let dirs = fs.list_dirs(Path::new("root")).unwrap();
/// assert_eq!(dirs, vec![Path::new("root/u1").to_path_buf()]);
/// ```
pub trait FileSystem {
    /// 직계 하위 폴더 목록 (이름순)
    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// 직계 파일 목록 (이름순)
    fn list_files(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// 파일 전체를 문자열로 읽기
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// 문자열을 파일에 쓰기 (기존 파일 덮어쓰기)
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// 폴더 생성 (이미 있으면 무시)
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// 경로 존재 여부
    fn exists(&self, path: &Path) -> bool;

    /// 폴더 여부
    fn is_dir(&self, path: &Path) -> bool;
}

/// 실제 디스크를 사용하는 파일 시스템
///
/// 임계값 이상의 큰 모듈 파일은 메모리 매핑으로 읽습니다.
#[derive(Debug, Clone, Copy)]
pub struct OsFileSystem {
    mmap_threshold: u64,
}

impl Default for OsFileSystem {
    fn default() -> Self {
        Self {
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl OsFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, mmap_threshold: u64) -> Self {
        self.mmap_threshold = mmap_threshold;
        self
    }

    /// 메모리 매핑으로 파일 읽기 (대용량 파일용)
    fn read_mapped(path: &Path) -> io::Result<String> {
        let file = File::open(path)?;
        // 읽는 동안 파일이 바뀌지 않는다고 가정
        let mmap = unsafe { Mmap::map(&file)? };
        std::str::from_utf8(&mmap)
            .map(str::to_owned)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// 직계 항목을 이름순으로 나열하고 조건에 맞는 경로만 반환
    fn list_children(path: &Path, keep: impl Fn(&Path) -> bool) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            if keep(entry.path()) {
                children.push(entry.into_path());
            }
        }
        Ok(children)
    }
}

impl FileSystem for OsFileSystem {
    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        Self::list_children(path, Path::is_dir)
    }

    fn list_files(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        Self::list_children(path, Path::is_file)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let size = std::fs::metadata(path)?.len();
        // 빈 파일은 매핑할 수 없으므로 일반 읽기
        if size > 0 && size >= self.mmap_threshold {
            Self::read_mapped(path)
        } else {
            std::fs::read_to_string(path)
        }
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        match std::fs::create_dir(path) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            other => other,
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

/// 메모리 기반 파일 시스템
///
/// 디스크 없이 병합/저장 흐름을 시험하거나 다른 프로그램에 내장할 때 사용합니다.
/// 단일 스레드 전용입니다.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: RefCell<MemoryState>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// 파일 추가 (상위 폴더도 함께 등록)
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        let mut state = self.state_mut();
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            state.dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        state.files.insert(path, content.into());
    }

    /// 빈 폴더 추가
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.state_mut().dirs.insert(path.into());
    }

    /// 파일 내용 조회
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state_mut().files.get(path.as_ref()).cloned()
    }

    /// 특정 폴더 바로 아래의 파일 경로 목록
    pub fn files_in(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        self.state_mut()
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect()
    }

    fn state_mut(&self) -> RefMut<'_, MemoryState> {
        self.state.borrow_mut()
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("경로를 찾을 수 없습니다: {}", path.display()),
        )
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.state_mut();
        if !state.dirs.contains(path) {
            return Err(Self::not_found(path));
        }
        Ok(state
            .dirs
            .iter()
            .filter(|d| d.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn list_files(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.state_mut().dirs.contains(path) {
            return Err(Self::not_found(path));
        }
        Ok(self.files_in(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.file(path).ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut state = self.state_mut();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !state.dirs.contains(parent) {
                return Err(Self::not_found(parent));
            }
        }
        state.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.state_mut().dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state_mut();
        state.dirs.contains(path) || state.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state_mut().dirs.contains(path)
    }
}
