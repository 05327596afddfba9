use std::io::{self, Read};

const READ_BUFFER_SIZE: usize = 1024;

/// Streams ASCII words (`[a-zA-Z]+`) out of a reader.
///
/// Every other byte, including all non-ASCII bytes, separates words. Once the
/// input is exhausted, or a read fails, the iterator keeps returning `None`.
pub struct WordReader<R> {
    reader: R,
    buf: Box<[u8; READ_BUFFER_SIZE]>,
    pos: usize,
    len: usize,
    word: Vec<u8>,
    done: bool,
}

impl<R: Read> WordReader<R> {
    pub fn new(reader: R) -> Self {
        WordReader {
            reader,
            buf: Box::new([0; READ_BUFFER_SIZE]),
            pos: 0,
            len: 0,
            word: Vec::new(),
            done: false,
        }
    }

    fn take_word(&mut self) -> String {
        // Only ASCII letters are ever buffered.
        let word = self.word.iter().map(|&b| b as char).collect();
        self.word.clear();
        word
    }

    fn fill(&mut self) -> io::Result<usize> {
        loop {
            match self.reader.read(&mut self.buf[..]) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}

impl<R: Read> Iterator for WordReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            while self.pos < self.len {
                let byte = self.buf[self.pos];
                self.pos += 1;
                if byte.is_ascii_alphabetic() {
                    self.word.push(byte);
                } else if !self.word.is_empty() {
                    return Some(Ok(self.take_word()));
                }
            }

            match self.fill() {
                Ok(0) => {
                    self.done = true;
                    if self.word.is_empty() {
                        return None;
                    }
                    return Some(Ok(self.take_word()));
                }
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
