use arch::{Error, Result, Word};
use color_print::cprintln;
use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Console and display attached to a running processor.
pub trait Device {
    /// Next integer for `in`, `None` when input is exhausted or malformed.
    fn input(&mut self) -> Option<Word>;
    fn output(&mut self, val: Word);
    /// Present the video region, `width` cells per row.
    fn redraw(&mut self, video: &[Word], width: usize);
}

/// Terminal device: integers in from a file or stdin, integers out to stdout
/// and optionally a file, video drawn as text.
pub struct Serial {
    style: bool,
    headless: bool,
    read_buf: Box<dyn BufRead>,
    pending: VecDeque<Word>,
    write_buf: Option<Box<dyn Write>>,
}

impl Serial {
    pub fn arg(
        style: bool,
        headless: bool,
        read_file: Option<&Path>,
        write_file: Option<&Path>,
    ) -> Result<Serial> {
        let read_buf: Box<dyn BufRead> = match read_file {
            Some(file) => {
                let f = File::open(file)
                    .map_err(|e| Error::FileOpen(file.display().to_string(), e))?;
                Box::new(BufReader::new(f))
            }
            None => Box::new(BufReader::new(std::io::stdin())),
        };
        let write_buf = match write_file {
            Some(file) => {
                let f = File::create(file)
                    .map_err(|e| Error::FileCreate(file.display().to_string(), e))?;
                Some(Box::new(BufWriter::new(f)) as Box<dyn Write>)
            }
            None => None,
        };
        Ok(Serial {
            style,
            headless,
            read_buf,
            pending: VecDeque::new(),
            write_buf,
        })
    }

    /// Serial reading from an in-memory buffer and writing only to stdout.
    pub fn from_reader(reader: impl BufRead + 'static, headless: bool) -> Serial {
        Serial {
            style: false,
            headless,
            read_buf: Box::new(reader),
            pending: VecDeque::new(),
            write_buf: None,
        }
    }

    fn fill(&mut self) -> bool {
        let mut line = String::new();
        loop {
            line.clear();
            match self.read_buf.read_line(&mut line) {
                Ok(0) => return false,
                Ok(_) => {}
                Err(err) => {
                    log::error!("input: {}", err);
                    return false;
                }
            }
            for token in line.split_whitespace() {
                match token.parse::<Word>() {
                    Ok(val) => self.pending.push_back(val),
                    Err(_) => {
                        log::warn!("input: `{}` is not an integer", token);
                        return !self.pending.is_empty();
                    }
                }
            }
            if !self.pending.is_empty() {
                return true;
            }
        }
    }
}

impl Device for Serial {
    fn input(&mut self) -> Option<Word> {
        if self.pending.is_empty() && !self.fill() {
            return None;
        }
        self.pending.pop_front()
    }

    fn output(&mut self, val: Word) {
        match self.style {
            true => cprintln!(" > <r,s>{}</>", val),
            false => println!("{}", val),
        }
        if let Some(buf) = self.write_buf.as_mut() {
            if let Err(err) = writeln!(buf, "{}", val) {
                log::error!("output: {}", err);
            }
        }
    }

    fn redraw(&mut self, video: &[Word], width: usize) {
        if self.headless {
            return;
        }
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for line in render(video, width) {
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out, "{}", "-".repeat(width));
    }
}

impl Drop for Serial {
    fn drop(&mut self) {
        if let Some(buf) = self.write_buf.as_mut() {
            if let Err(err) = buf.flush() {
                log::error!("output: {}", err);
            }
        }
    }
}

/// Text rendering of the video region: `#` for set cells, trailing blanks
/// trimmed.
pub fn render(video: &[Word], width: usize) -> Vec<String> {
    video
        .chunks(width.max(1))
        .map(|row| {
            let line: String = row
                .iter()
                .map(|&c| if c != 0 { '#' } else { ' ' })
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

/// In-memory device for embedding and tests.
#[derive(Debug, Default)]
pub struct Scripted {
    pub input: VecDeque<Word>,
    pub output: Vec<Word>,
    pub frames: Vec<Vec<String>>,
}

impl Scripted {
    pub fn new(input: impl IntoIterator<Item = Word>) -> Self {
        Scripted {
            input: input.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Device for Scripted {
    fn input(&mut self) -> Option<Word> {
        self.input.pop_front()
    }

    fn output(&mut self, val: Word) {
        self.output.push(val);
    }

    fn redraw(&mut self, video: &[Word], width: usize) {
        self.frames.push(render(video, width));
    }
}
