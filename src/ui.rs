pub fn render_index(current_weight: f64, target_weight: f64) -> String {
    INDEX_HTML
        .replace("{{WEIGHT}}", &format!("{current_weight:.1}"))
        .replace("{{TARGET}}", &format!("{target_weight:.1}"))
}

pub fn render_console() -> String {
    CONSOLE_HTML.to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="he" dir="rtl">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>מעקב תזונה</title>
  <style>
    :root {
      --primary: #0077c8;
      --primary-dark: #0f4c81;
      --accent: #ffc20e;
      --ink: #22303c;
      --card: #ffffff;
      --bg: #f2f6fa;
      --ok: #2d7a4b;
      --warn: #b26a00;
      --bad: #c63b2b;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: 'Segoe UI', 'Arial Hebrew', sans-serif;
      padding-bottom: 72px;
    }
    header.topbar {
      background: var(--primary);
      color: white;
      padding: 14px 18px;
      font-size: 1.15rem;
      font-weight: 600;
    }
    main { max-width: 720px; margin: 0 auto; padding: 16px; }
    #panel { transition: opacity 150ms ease; }
    #panel.fading { opacity: 0.3; }
    .card {
      background: var(--card);
      border-radius: 14px;
      box-shadow: 0 4px 14px rgba(15, 76, 129, 0.08);
      padding: 16px;
      margin-bottom: 14px;
    }
    .card h3 { margin: 0 0 10px; font-size: 1.05rem; }
    .stat-row { display: flex; gap: 12px; }
    .stat { flex: 1; text-align: center; }
    .stat .value { font-size: 1.5rem; font-weight: 700; color: var(--primary); }
    .stat .label { font-size: 0.8rem; color: #6b7a88; }
    .task { display: flex; align-items: center; gap: 10px; padding: 8px 4px; border-bottom: 1px solid #eef2f6; }
    .task:last-child { border-bottom: none; }
    .task .mark { width: 22px; text-align: center; }
    .task.done .mark { color: var(--ok); }
    .task small { color: #8795a3; display: block; }
    .alert { border-radius: 10px; padding: 10px 12px; margin-top: 10px; font-size: 0.92rem; }
    .alert.success { background: #e7f5ec; color: var(--ok); }
    .alert.warning { background: #fdf3e0; color: var(--warn); }
    .alert.danger { background: #fdeae7; color: var(--bad); }
    form label { display: block; margin: 10px 0 4px; font-weight: 600; font-size: 0.9rem; }
    input[type='number'], input[type='text'], input[type='date'], input[type='time'], textarea, select {
      width: 100%; padding: 9px 10px; border: 1px solid #cdd8e2; border-radius: 9px; font-size: 0.95rem;
    }
    .radio-row { display: flex; gap: 8px; flex-wrap: wrap; }
    .radio-row label { font-weight: 400; margin: 0; display: flex; align-items: center; gap: 4px; }
    button.primary {
      background: var(--primary); color: white; border: none; border-radius: 10px;
      padding: 11px 16px; font-size: 0.98rem; font-weight: 600; cursor: pointer; margin-top: 12px;
    }
    button.primary:disabled { background: #9db8cc; cursor: not-allowed; }
    button.ghost {
      background: transparent; color: var(--primary); border: 1px solid var(--primary);
      border-radius: 10px; padding: 9px 14px; cursor: pointer; margin-top: 12px;
    }
    .window-buttons button {
      background: #eaf1f7; border: none; border-radius: 8px; padding: 6px 10px; margin-inline-start: 6px; cursor: pointer;
    }
    .window-buttons button.active { background: var(--primary); color: white; }
    svg.chart { width: 100%; height: 240px; display: block; }
    .chart-line { fill: none; stroke: var(--primary); stroke-width: 2.5; }
    .chart-target { fill: none; stroke: var(--accent); stroke-width: 2; stroke-dasharray: 5 5; }
    .chart-point { fill: white; stroke: var(--primary); stroke-width: 2; }
    .chart-label { fill: #7a8793; font-size: 10px; }
    .chart-grid { stroke: #e3ebf2; }
    .progress-track { background: #e3ebf2; border-radius: 999px; height: 10px; overflow: hidden; }
    .progress-fill { background: var(--ok); height: 100%; width: 0; transition: width 250ms ease; }
    .question { border: 1px solid #e3ebf2; border-radius: 12px; padding: 12px; margin-bottom: 12px; }
    .question .num { color: var(--primary); font-weight: 700; margin-inline-end: 6px; }
    .required::after { content: ' *'; color: var(--bad); }
    .messages { display: flex; flex-direction: column; gap: 8px; max-height: 380px; overflow-y: auto; padding: 4px; }
    .msg { max-width: 80%; padding: 9px 12px; border-radius: 14px; font-size: 0.93rem; }
    .msg.athlete { align-self: flex-start; background: var(--primary); color: white; }
    .msg.nutritionist { align-self: flex-end; background: #eaf1f7; }
    .msg.urgent { border: 2px solid var(--bad); }
    .msg .meta { display: block; font-size: 0.72rem; opacity: 0.75; margin-top: 3px; }
    .urgent-badge { color: var(--bad); font-size: 0.78rem; font-weight: 700; }
    .typing { color: #8795a3; font-size: 0.85rem; min-height: 1.2em; padding: 4px; }
    .chat-input { display: flex; gap: 8px; margin-top: 10px; }
    .chat-input input { flex: 1; }
    .chat-input button { margin-top: 0; }
    .quick { display: flex; flex-wrap: wrap; gap: 6px; margin-top: 8px; }
    .quick button { background: #eaf1f7; border: none; border-radius: 999px; padding: 6px 12px; cursor: pointer; font-size: 0.82rem; }
    .status-line { font-size: 0.85rem; color: #6b7a88; margin-bottom: 8px; }
    .status-line .dot { color: var(--ok); }
    .status-line .dot.off { color: #b0bcc7; }
    nav.tabs {
      position: fixed; bottom: 0; right: 0; left: 0; background: white;
      display: flex; border-top: 1px solid #e3ebf2;
    }
    nav.tabs a {
      flex: 1; text-align: center; padding: 12px 4px; color: #6b7a88; text-decoration: none; font-size: 0.85rem;
    }
    nav.tabs a.active { color: var(--primary); font-weight: 700; }
    .flash { position: fixed; top: 14px; right: 14px; left: 14px; z-index: 50; }
    .flash .alert { box-shadow: 0 6px 18px rgba(34, 48, 60, 0.18); }
  </style>
</head>
<body>
  <header class="topbar">מעקב תזונה לספורטאים <small style="font-weight:400;opacity:0.85">יעד נוכחי: {{TARGET}} ק"ג</small></header>
  <main>
    <div id="panel"></div>
  </main>
  <div class="flash" id="flash"></div>
  <nav class="tabs">
    <a data-tab="home" class="active">בית</a>
    <a data-tab="weight">משקל</a>
    <a data-tab="assessment">שאלון</a>
    <a data-tab="chat">צ'אט</a>
  </nav>

  <script>
    const panel = document.getElementById('panel');
    const flash = document.getElementById('flash');
    const navItems = Array.from(document.querySelectorAll('nav.tabs a'));

    let currentTab = 'home';
    let chatPoll = null;
    let autosavePing = null;

    const INITIAL_WEIGHT = '{{WEIGHT}}';

    const api = async (path, options) => {
      const res = await fetch(path, options);
      if (!res.ok) {
        throw new Error(await res.text() || 'הבקשה נכשלה');
      }
      return res.json();
    };

    const showFlash = (message, kind) => {
      const div = document.createElement('div');
      div.className = 'alert ' + (kind || 'success');
      div.textContent = message;
      flash.appendChild(div);
      setTimeout(() => div.remove(), 4000);
    };

    const setActiveNav = (tab) => {
      navItems.forEach((item) => item.classList.toggle('active', item.dataset.tab === tab));
    };

    const stopTabTimers = () => {
      if (chatPoll) { clearInterval(chatPoll); chatPoll = null; }
      if (autosavePing) { clearTimeout(autosavePing); autosavePing = null; }
    };

    const switchToTab = async (tab, pushHistory = true) => {
      if (tab === currentTab && panel.innerHTML !== '') return;
      stopTabTimers();
      const view = await api('/api/tab/switch', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ tab })
      });
      currentTab = view.tab;
      setActiveNav(view.tab);
      if (pushHistory) {
        history.pushState({ tab: view.tab }, '', '');
      }
      panel.classList.add('fading');
      setTimeout(() => {
        renderTab(view.tab, view.content);
        panel.classList.remove('fading');
      }, view.changed ? view.fade_out_ms : 0);
    };

    const renderTab = (tab, content) => {
      if (tab === 'weight') { renderWeight(content); }
      else if (tab === 'assessment') { renderAssessment(content); }
      else if (tab === 'chat') { renderChat(content); }
      else { renderHome(content); }
    };

    // ---- home ----

    const renderHome = (home) => {
      const current = home.current_weight == null ? Number(INITIAL_WEIGHT) : home.current_weight;
      const diff = current - home.target_weight;
      const doneCount = home.tasks.filter((t) => t.done).length;
      panel.innerHTML = `
        <div class="card" style="text-align:center">
          <h3>היי ${home.athlete_name}! 👋</h3>
          <p style="color:#6b7a88">אתה ${Math.abs(diff).toFixed(1)} ק"ג ממשקל היעד לתחרות הבאה</p>
        </div>
        <div class="card stat-row">
          <div class="stat"><span class="value">${current.toFixed(1)}</span><span class="label">משקל נוכחי (ק"ג)</span></div>
          <div class="stat"><span class="value">${home.target_weight.toFixed(1)}</span><span class="label">יעד (ק"ג)</span></div>
        </div>
        <div class="card">
          <h3>משימות היום <small>${doneCount}/${home.tasks.length}</small></h3>
          ${home.tasks.map((t) => `
            <div class="task ${t.done ? 'done' : ''}">
              <span class="mark">${t.done ? '✔' : '○'}</span>
              <span>${t.title}<small>${t.hint}</small></span>
            </div>`).join('')}
        </div>
        <div class="card stat-row">
          <button class="primary" style="flex:1" data-goto="weight">רישום משקל</button>
          <button class="ghost" style="flex:1" data-goto="chat">צ'אט עם התזונאית</button>
        </div>`;
      panel.querySelectorAll('[data-goto]').forEach((btn) => {
        btn.addEventListener('click', () => switchToTab(btn.dataset.goto));
      });
    };

    // ---- weight ----

    const drawChart = (svg, chart) => {
      const width = 600, height = 240, padX = 40, padY = 28;
      const values = chart.weights.filter((w) => w != null).concat(chart.targets);
      if (!values.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">אין נתונים עדיין</text>';
        return;
      }
      let min = Math.min(...values) - 0.5;
      let max = Math.max(...values) + 0.5;
      const n = chart.labels.length;
      const xStep = n > 1 ? (width - padX * 2) / (n - 1) : 0;
      const x = (i) => padX + i * xStep;
      const y = (v) => height - padY - ((v - min) / (max - min)) * (height - padY * 2);

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const v = min + ((max - min) * i) / 4;
        grid += `<line class="chart-grid" x1="${padX}" y1="${y(v)}" x2="${width - padX}" y2="${y(v)}" />`;
        grid += `<text class="chart-label" x="${padX - 8}" y="${y(v) + 3}" text-anchor="end">${v.toFixed(1)}</text>`;
      }

      // Gap-aware line: a missing day breaks the path instead of interpolating.
      let path = '';
      let pen = false;
      chart.weights.forEach((w, i) => {
        if (w == null) { pen = false; return; }
        path += `${pen ? 'L' : 'M'} ${x(i).toFixed(1)} ${y(w).toFixed(1)} `;
        pen = true;
      });

      const target = `M ${padX} ${y(chart.targets[0]).toFixed(1)} L ${width - padX} ${y(chart.targets[0]).toFixed(1)}`;
      const points = chart.weights
        .map((w, i) => w == null ? '' : `<circle class="chart-point" cx="${x(i)}" cy="${y(w)}" r="3.5" />`)
        .join('');
      const every = n > 10 ? Math.ceil(n / 7) : 1;
      const labels = chart.labels
        .map((label, i) => i % every === 0
          ? `<text class="chart-label" x="${x(i)}" y="${height - padY + 14}" text-anchor="middle">${label}</text>`
          : '')
        .join('');

      svg.setAttribute('viewBox', `0 0 ${width} ${height}`);
      svg.innerHTML = grid + `<path class="chart-target" d="${target}" />` + `<path class="chart-line" d="${path.trim()}" />` + points + labels;
    };

    const alertBlock = (alert) => alert
      ? `<div class="alert ${alert.level}">${alert.message}</div>`
      : '';

    const renderWeight = (view) => {
      const current = view.current_weight == null ? '—' : view.current_weight.toFixed(1);
      const diff = view.difference == null ? '—' : (view.difference > 0 ? '+' : '') + view.difference.toFixed(1);
      panel.innerHTML = `
        <div class="card">
          <h3>מעקב משקל</h3>
          <div class="stat-row">
            <div class="stat"><span class="value">${current}</span><span class="label">משקל נוכחי</span></div>
            <div class="stat"><span class="value">${view.target_weight.toFixed(1)}</span><span class="label">יעד</span></div>
            <div class="stat"><span class="value">${diff}</span><span class="label">נותר</span></div>
            <div class="stat"><span class="value">${Math.round(view.progress_percent)}%</span><span class="label">התקדמות</span></div>
          </div>
          <div class="progress-track" style="margin-top:10px"><div class="progress-fill" style="width:${view.progress_percent}%"></div></div>
          <div id="smartAlert">${alertBlock(view.alert)}</div>
        </div>
        <div class="card">
          <h3>רישום משקל חדש</h3>
          <form id="weightForm">
            <label class="required" for="weightInput">משקל (ק"ג)</label>
            <input type="number" id="weightInput" step="0.1" min="30" max="250" inputmode="decimal" placeholder="0.0" />
            <label class="required">זמן שקילה</label>
            <div class="radio-row">
              <label><input type="radio" name="measurementTime" value="בוקר" /> בוקר</label>
              <label><input type="radio" name="measurementTime" value="ערב" /> ערב</label>
            </div>
            <label for="weightNotes">הערות (אופציונלי)</label>
            <textarea id="weightNotes" rows="2" placeholder="איך את/ה מרגיש/ה, שינויים, הערות..."></textarea>
            <button class="primary" type="submit">שמור משקל</button>
          </form>
        </div>
        <div class="card">
          <h3>גרף התקדמות
            <span class="window-buttons">
              <button data-days="7">7 ימים</button>
              <button data-days="14" class="active">14 ימים</button>
              <button data-days="30">30 ימים</button>
            </span>
          </h3>
          <svg class="chart" id="weightChart" viewBox="0 0 600 240"></svg>
        </div>`;

      drawChart(document.getElementById('weightChart'), view.chart);

      panel.querySelectorAll('[data-days]').forEach((btn) => {
        btn.addEventListener('click', async () => {
          panel.querySelectorAll('[data-days]').forEach((b) => b.classList.remove('active'));
          btn.classList.add('active');
          const chart = await api('/api/weight/chart/' + btn.dataset.days);
          drawChart(document.getElementById('weightChart'), chart);
        });
      });

      document.getElementById('weightForm').addEventListener('submit', async (event) => {
        event.preventDefault();
        const weightRaw = document.getElementById('weightInput').value;
        const time = panel.querySelector('input[name=measurementTime]:checked');
        try {
          const updated = await api('/api/weight', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({
              weight: weightRaw === '' ? null : Number(weightRaw),
              time: time ? time.value : null,
              notes: document.getElementById('weightNotes').value || null
            })
          });
          showFlash('המשקל נשמר בהצלחה!');
          renderWeight(updated);
        } catch (err) {
          showFlash(err.message, 'warning');
        }
      });
    };

    // ---- assessment ----

    const scale = (name, checked) => [1, 2, 3, 4, 5].map((v) =>
      `<label><input type="radio" name="${name}" value="${v}" ${String(v) === checked ? 'checked' : ''} /> ${v}</label>`).join('');

    const collectAnswers = () => {
      const value = (id) => { const el = document.getElementById(id); return el && el.value !== '' ? el.value : null; };
      const picked = (name) => { const el = panel.querySelector(`input[name=${name}]:checked`); return el ? el.value : null; };
      const supplements = Array.from(panel.querySelectorAll('input[data-supplement]:checked')).map((el) => el.value);
      const health = Array.from(panel.querySelectorAll('input[data-health]:checked')).map((el) => {
        const issue = { type: el.value };
        if (el.value === 'injury') {
          const detail = value('injuryDetail');
          if (detail) issue.detail = detail;
        }
        return issue;
      });
      const applicable = document.getElementById('applicableToMe');
      return {
        assessment_date: value('assessmentDate'),
        daily_weight: value('dailyWeight'),
        sleep_hours: picked('sleepHours'),
        sleep_quality: picked('sleepQuality'),
        sleep_time: value('sleepTime'),
        wake_time: value('wakeTime'),
        appetite: picked('appetite'),
        water_intake: value('waterIntake'),
        water_unit: value('waterUnit'),
        supplements,
        menstrual_applicable: !!(applicable && applicable.checked),
        menstrual_cycle: picked('menstrualCycle'),
        last_period_date: value('lastPeriodDate'),
        health_issues: health,
        mood: picked('mood'),
        energy: picked('energy'),
        recovery: picked('recovery'),
        additional_notes: value('additionalNotes')
      };
    };

    const updateProgressBar = (report) => {
      document.getElementById('assessmentProgress').style.width = report.percent + '%';
      document.getElementById('progressText').textContent = report.satisfied + '/' + report.total;
      document.getElementById('submitBtn').disabled = !report.submit_enabled;
    };

    const renderAssessment = (view) => {
      const a = view.answers;
      const supplements = [
        ['magnesium', 'מגנזיום'], ['iron', 'ברזל'], ['omega3', 'אומגה 3'], ['creatine', 'קריאטין'], ['beta-alanine', 'בטא אלאנין']
      ];
      const health = [
        ['injury', 'פציעה'], ['stomach-pain', 'כאבי בטן'], ['muscle-pain', 'כאבי שרירים'],
        ['constipation', 'עצירות'], ['diarrhea', 'שלשול'], ['headaches', 'כאבי ראש']
      ];
      const injuryIssue = a.health_issues.find((h) => h.type === 'injury');
      panel.innerHTML = `
        <div class="card">
          <h3>שאלון הערכה שבועי <small>השבוע של ${view.week_label}</small></h3>
          <div class="progress-track"><div class="progress-fill" id="assessmentProgress" style="width:${view.progress.percent}%"></div></div>
          <small><span id="progressText">${view.progress.satisfied}/${view.progress.total}</span> שאלות</small>
        </div>
        <form id="assessmentForm" class="card">
          <div class="question"><span class="num">📅</span><span class="required">תאריך הערכה</span>
            <input type="date" id="assessmentDate" value="${a.assessment_date || ''}" /></div>
          <div class="question"><span class="num">1</span><span class="required">משקל יומי (ק"ג)</span>
            <input type="number" id="dailyWeight" step="0.1" min="40" max="150" value="${a.daily_weight || ''}" /></div>
          <div class="question"><span class="num">2</span><span class="required">שעות שינה</span>
            <div class="radio-row">
              ${[['less-than-6', 'פחות מ-6'], ['6-7', '6-7'], ['7-8', '7-8'], ['more-than-8', 'יותר מ-8']]
                .map(([v, t]) => `<label><input type="radio" name="sleepHours" value="${v}" ${a.sleep_hours === v ? 'checked' : ''} /> ${t}</label>`).join('')}
            </div></div>
          <div class="question"><span class="num">3</span><span class="required">איכות שינה (1-5)</span>
            <div class="radio-row">${scale('sleepQuality', a.sleep_quality)}</div></div>
          <div class="question"><span class="num">4</span><span class="required">זמני שינה</span>
            <label>שעת שינה</label><input type="time" id="sleepTime" value="${a.sleep_time || ''}" />
            <label>שעת קימה</label><input type="time" id="wakeTime" value="${a.wake_time || ''}" /></div>
          <div class="question"><span class="num">5</span><span class="required">תיאבון (1-5)</span>
            <div class="radio-row">${scale('appetite', a.appetite)}</div></div>
          <div class="question"><span class="num">6</span><span class="required">צריכת מים</span>
            <input type="number" id="waterIntake" step="0.1" min="0" max="10" value="${a.water_intake || ''}" />
            <select id="waterUnit">
              <option value="liters">ליטרים</option>
              <option value="cups">כוסות</option>
              <option value="bottles">בקבוקים</option>
            </select></div>
          <div class="question"><span class="num">7</span> תוספי תזונה
            <div class="radio-row">
              ${supplements.map(([v, t]) => `<label><input type="checkbox" data-supplement value="${v}" ${a.supplements.includes(v) ? 'checked' : ''} /> ${t}</label>`).join('')}
            </div></div>
          <div class="question" id="cycleQuestion" style="display:${view.show_cycle_question ? 'block' : 'none'}">
            <span class="num">8</span> מחזור חודשי
            <label><input type="checkbox" id="applicableToMe" ${a.menstrual_applicable ? 'checked' : ''} /> רלוונטי עבורי</label>
            <div id="cycleOptions" style="display:${a.menstrual_applicable ? 'block' : 'none'}">
              <div class="radio-row">
                ${[['regular', 'סדיר'], ['irregular', 'לא סדיר'], ['none', 'אין']]
                  .map(([v, t]) => `<label><input type="radio" name="menstrualCycle" value="${v}" ${a.menstrual_cycle === v ? 'checked' : ''} /> ${t}</label>`).join('')}
              </div>
              <label>תאריך מחזור אחרון</label>
              <input type="date" id="lastPeriodDate" value="${a.last_period_date || ''}" />
            </div></div>
          <div class="question"><span class="num">9</span> בעיות בריאות
            <div class="radio-row">
              ${health.map(([v, t]) => `<label><input type="checkbox" data-health value="${v}" ${a.health_issues.some((h) => h.type === v) ? 'checked' : ''} /> ${t}</label>`).join('')}
            </div>
            <div id="injuryDetailDiv" style="display:${injuryIssue ? 'block' : 'none'}">
              <label>פרט על הפציעה</label>
              <textarea id="injuryDetail" rows="2">${injuryIssue && injuryIssue.detail ? injuryIssue.detail : ''}</textarea>
            </div></div>
          <div class="question"><span class="num">10</span><span class="required">מצב רוח (1-5)</span>
            <div class="radio-row">${scale('mood', a.mood)}</div></div>
          <div class="question"><span class="num">11</span><span class="required">אנרגיה (1-5)</span>
            <div class="radio-row">${scale('energy', a.energy)}</div></div>
          <div class="question"><span class="num">12</span><span class="required">התאוששות (1-5)</span>
            <div class="radio-row">${scale('recovery', a.recovery)}</div></div>
          <div class="question"><span class="num">13</span> הערות נוספות
            <textarea id="additionalNotes" rows="2">${a.additional_notes || ''}</textarea></div>
          <button class="primary" id="submitBtn" type="submit" ${view.progress.submit_enabled ? '' : 'disabled'}>שלח שאלון</button>
          <button class="ghost" id="saveDraftBtn" type="button">שמור טיוטה</button>
          <button class="ghost" id="sendBtn" type="button">שלח לתזונאית</button>
        </form>`;

      if (a.water_unit) document.getElementById('waterUnit').value = a.water_unit;

      const form = document.getElementById('assessmentForm');
      const setDisabled = (disabled) => {
        form.querySelectorAll('input, select, textarea, button').forEach((el) => { el.disabled = disabled; });
      };
      if (view.submitted) setDisabled(true);

      const applicable = document.getElementById('applicableToMe');
      applicable.addEventListener('change', () => {
        document.getElementById('cycleOptions').style.display = applicable.checked ? 'block' : 'none';
      });
      panel.querySelectorAll('input[data-health]').forEach((el) => {
        el.addEventListener('change', () => {
          if (el.value === 'injury') {
            document.getElementById('injuryDetailDiv').style.display = el.checked ? 'block' : 'none';
          }
        });
      });

      // Every change refreshes the progress bar and pushes the working
      // answers; the server restarts its 30s autosave debounce per push.
      const onFieldChange = () => {
        recomputeProgress();
        if (autosavePing) clearTimeout(autosavePing);
        autosavePing = setTimeout(async () => {
          try {
            await api('/api/assessment/draft', {
              method: 'POST',
              headers: { 'content-type': 'application/json' },
              body: JSON.stringify({ answers: collectAnswers() })
            });
          } catch (err) { console.error(err); }
        }, 400);
      };
      form.addEventListener('input', onFieldChange);
      form.addEventListener('change', onFieldChange);

      function recomputeProgress() {
        const answers = collectAnswers();
        const total = 14;
        let satisfied = 0;
        const filled = (v) => v != null && String(v).trim() !== '';
        if (filled(answers.assessment_date)) satisfied += 1;
        if (filled(answers.daily_weight)) satisfied += 1;
        if (filled(answers.sleep_hours)) satisfied += 1;
        if (filled(answers.sleep_quality)) satisfied += 1;
        if (filled(answers.sleep_time) && filled(answers.wake_time)) satisfied += 1;
        if (filled(answers.appetite)) satisfied += 1;
        if (filled(answers.water_intake)) satisfied += 1;
        satisfied += 1; // supplements
        if (!answers.menstrual_applicable || filled(answers.menstrual_cycle)) satisfied += 1;
        satisfied += 1; // health issues
        if (filled(answers.mood)) satisfied += 1;
        if (filled(answers.energy)) satisfied += 1;
        if (filled(answers.recovery)) satisfied += 1;
        satisfied += 1; // notes
        const percent = (satisfied / total) * 100;
        updateProgressBar({ satisfied, total, percent, submit_enabled: percent >= 85 });
      }

      document.getElementById('saveDraftBtn').addEventListener('click', async () => {
        try {
          const res = await api('/api/assessment/save', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ answers: collectAnswers() })
          });
          showFlash(res.message);
        } catch (err) { showFlash(err.message, 'warning'); }
      });

      document.getElementById('sendBtn').addEventListener('click', async () => {
        try {
          const res = await api('/api/assessment/send', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ answers: collectAnswers() })
          });
          showFlash(res.message);
        } catch (err) { showFlash(err.message, 'warning'); }
      });

      form.addEventListener('submit', async (event) => {
        event.preventDefault();
        try {
          const res = await api('/api/assessment/submit', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ answers: collectAnswers() })
          });
          showFlash(res.message);
          setDisabled(true);
        } catch (err) { showFlash(err.message, 'warning'); }
      });
    };

    // ---- chat ----

    const statusIcon = (status) => status === 'sent' ? '✓' : '✓✓';

    const messageHtml = (m) => `
      <div class="msg ${m.from} ${m.urgent ? 'urgent' : ''}">
        ${m.urgent && m.from === 'nutritionist' ? '<span class="urgent-badge">⚠ דחוף</span>' : ''}
        <span>${m.content}</span>
        <span class="meta">${new Date(m.timestamp).toLocaleTimeString('he-IL', { hour: '2-digit', minute: '2-digit' })}
          ${m.from === 'athlete' ? statusIcon(m.status) : ''}</span>
      </div>`;

    const renderChat = (view) => {
      panel.innerHTML = `
        <div class="card">
          <div class="status-line">
            <span class="dot ${view.status.online ? '' : 'off'}">●</span>
            התזונאית: ${view.status.label} · שעות פעילות ${view.status.working_hours}
          </div>
          <div class="messages" id="chatMessages">${view.messages.map(messageHtml).join('')}</div>
          <div class="typing" id="typingIndicator">${view.typing ? 'התזונאית מקלידה...' : ''}</div>
          <div class="quick">${view.quick_messages.map((q) => `<button type="button" data-quick>${q}</button>`).join('')}</div>
          <div class="chat-input">
            <input type="text" id="chatInput" placeholder="הקלד הודעה..." />
            <button class="primary" id="sendButton" type="button">שלח</button>
          </div>
        </div>`;

      const list = document.getElementById('chatMessages');
      list.scrollTop = list.scrollHeight;

      const send = async (text) => {
        if (!text.trim()) return;
        try {
          await api('/api/chat/send', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ content: text })
          });
          document.getElementById('chatInput').value = '';
          refreshChat();
        } catch (err) { showFlash(err.message, 'warning'); }
      };

      document.getElementById('sendButton').addEventListener('click', () => {
        send(document.getElementById('chatInput').value);
      });
      document.getElementById('chatInput').addEventListener('keypress', (event) => {
        if (event.key === 'Enter') { event.preventDefault(); send(event.target.value); }
      });
      panel.querySelectorAll('[data-quick]').forEach((btn) => {
        btn.addEventListener('click', () => send(btn.textContent));
      });

      // Plain polling variant: refresh the thread every 3 seconds while
      // the chat tab is visible.
      if (chatPoll) clearInterval(chatPoll);
      chatPoll = setInterval(refreshChat, 3000);
    };

    const refreshChat = async () => {
      if (currentTab !== 'chat') return;
      try {
        const view = await api('/api/chat/messages');
        const list = document.getElementById('chatMessages');
        if (!list) return;
        list.innerHTML = view.messages.map(messageHtml).join('');
        list.scrollTop = list.scrollHeight;
        document.getElementById('typingIndicator').textContent = view.typing ? 'התזונאית מקלידה...' : '';
      } catch (err) {
        console.error('שגיאה בטעינת הודעות:', err);
      }
    };

    // ---- navigation wiring ----

    navItems.forEach((item) => {
      item.addEventListener('click', (event) => {
        event.preventDefault();
        switchToTab(item.dataset.tab);
      });
    });

    window.addEventListener('popstate', (event) => {
      const tab = event.state ? event.state.tab : 'home';
      switchToTab(tab, false);
    });

    history.replaceState({ tab: 'home' }, '', '');
    switchToTab('home', false);
  </script>
</body>
</html>
"#;

const CONSOLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="he" dir="rtl">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>מרכז הודעות - תזונאית</title>
  <style>
    :root { --primary: #0077c8; --bad: #c63b2b; --bg: #f2f6fa; }
    * { box-sizing: border-box; }
    body { margin: 0; background: var(--bg); font-family: 'Segoe UI', 'Arial Hebrew', sans-serif; color: #22303c; }
    header { background: var(--primary); color: white; padding: 14px 18px; display: flex; justify-content: space-between; align-items: center; }
    header select { border-radius: 8px; border: none; padding: 6px; }
    .layout { display: flex; max-width: 1000px; margin: 16px auto; gap: 14px; padding: 0 12px; }
    .sidebar { width: 320px; background: white; border-radius: 12px; padding: 10px; }
    .sidebar select { width: 100%; margin-bottom: 8px; padding: 7px; border-radius: 8px; border: 1px solid #cdd8e2; }
    .athlete { display: flex; gap: 10px; padding: 10px; border-radius: 10px; cursor: pointer; align-items: center; }
    .athlete:hover, .athlete.selected { background: #eaf1f7; }
    .athlete.urgent { border-right: 3px solid var(--bad); }
    .avatar { width: 38px; height: 38px; border-radius: 50%; background: var(--primary); color: white; display: flex; align-items: center; justify-content: center; font-weight: 700; }
    .athlete small { color: #8795a3; display: block; }
    .badge { background: var(--bad); color: white; border-radius: 999px; padding: 1px 8px; font-size: 0.75rem; }
    .chat { flex: 1; background: white; border-radius: 12px; padding: 12px; display: flex; flex-direction: column; min-height: 480px; }
    .messages { flex: 1; display: flex; flex-direction: column; gap: 8px; overflow-y: auto; padding: 4px; }
    .msg { max-width: 75%; padding: 9px 12px; border-radius: 14px; font-size: 0.92rem; }
    .msg.nutritionist { align-self: flex-end; background: var(--primary); color: white; }
    .msg.athlete { align-self: flex-start; background: #eaf1f7; }
    .msg.urgent { border: 2px solid var(--bad); }
    .msg .meta { display: block; font-size: 0.72rem; opacity: 0.75; margin-top: 3px; }
    .new-label { color: var(--bad); font-weight: 700; font-size: 0.72rem; }
    .typing { color: #8795a3; font-size: 0.85rem; min-height: 1.2em; }
    .templates { display: flex; flex-wrap: wrap; gap: 6px; margin: 8px 0; }
    .templates button { background: #eaf1f7; border: none; border-radius: 999px; padding: 5px 10px; cursor: pointer; font-size: 0.8rem; }
    .input-row { display: flex; gap: 8px; }
    .input-row input { flex: 1; padding: 9px; border: 1px solid #cdd8e2; border-radius: 9px; }
    .input-row button { background: var(--primary); color: white; border: none; border-radius: 9px; padding: 9px 16px; cursor: pointer; }
    .placeholder { color: #8795a3; text-align: center; margin-top: 120px; }
  </style>
</head>
<body>
  <header>
    <div>
      <strong>מרכז הודעות מתקדם</strong>
      <div style="font-size:0.8rem">ניהול תקשורת עם ספורטאים</div>
    </div>
    <label>סטטוס:
      <select id="statusSelector">
        <option value="זמינה">זמינה</option>
        <option value="עסוקה">עסוקה</option>
        <option value="לא זמינה">לא זמינה</option>
      </select>
    </label>
  </header>
  <div class="layout">
    <div class="sidebar">
      <select id="messageFilter">
        <option value="all">הכל</option>
        <option value="unread">חדשות</option>
        <option value="urgent">דחופות</option>
      </select>
      <div id="athletesList"></div>
    </div>
    <div class="chat" id="chatArea">
      <div class="placeholder">בחר ספורטאי מהרשימה להתחלת שיחה</div>
    </div>
  </div>

  <script>
    let selectedAthlete = null;
    let templates = [];
    let threadPoll = null;

    const api = async (path, options) => {
      const res = await fetch(path, options);
      if (!res.ok) throw new Error(await res.text() || 'הבקשה נכשלה');
      return res.json();
    };

    const loadAthletes = async () => {
      const view = await api('/api/console/athletes');
      templates = view.templates;
      document.getElementById('statusSelector').value = view.status.label;
      const filter = document.getElementById('messageFilter').value;
      const list = document.getElementById('athletesList');
      list.innerHTML = view.athletes
        .filter((a) => filter === 'all' || (filter === 'unread' ? a.unread > 0 : a.has_urgent))
        .map((a) => `
          <div class="athlete ${a.has_urgent ? 'urgent' : ''} ${a.id === selectedAthlete ? 'selected' : ''}" data-id="${a.id}">
            <div class="avatar">${a.avatar}</div>
            <div style="flex:1">
              <strong>${a.name}</strong> ${a.unread > 0 ? `<span class="badge">${a.unread}</span>` : ''}
              <small>${a.category} · ${a.days_to_competition} ימים לתחרות</small>
              ${a.last_message ? `<small>${a.last_message.content.slice(0, 40)}</small>` : ''}
            </div>
          </div>`).join('');
      list.querySelectorAll('.athlete').forEach((el) => {
        el.addEventListener('click', () => openThread(el.dataset.id));
      });
    };

    const statusIcon = (status) => status === 'sent' ? '✓' : '✓✓';

    const messageHtml = (m) => `
      <div class="msg ${m.from} ${m.urgent ? 'urgent' : ''}">
        <span>${m.content}</span>
        <span class="meta">
          ${new Date(m.timestamp).toLocaleTimeString('he-IL', { hour: '2-digit', minute: '2-digit' })}
          ${m.from === 'nutritionist' ? statusIcon(m.status) : ''}
          ${m.from === 'athlete' && !m.read ? '<span class="new-label">חדש</span>' : ''}
        </span>
      </div>`;

    const renderThread = (view) => {
      const area = document.getElementById('chatArea');
      area.innerHTML = `
        <div style="display:flex;gap:10px;align-items:center;border-bottom:1px solid #e3ebf2;padding-bottom:8px">
          <div class="avatar">${view.profile.avatar}</div>
          <div>
            <strong>צ'אט עם ${view.profile.name}</strong>
            <div style="font-size:0.8rem;color:#8795a3">${view.profile.category} · ${view.profile.age} שנים · ${view.profile.days_to_competition} ימים לתחרות</div>
          </div>
        </div>
        <div class="messages" id="messagesContainer">${view.messages.map(messageHtml).join('')}</div>
        <div class="typing" id="typingIndicator">${view.typing ? view.profile.name + ' מקליד...' : ''}</div>
        <div class="templates">${templates.slice(0, 4).map((t) => `<button type="button" data-template>${t}</button>`).join('')}</div>
        <div class="input-row">
          <input type="text" id="messageInput" placeholder="הקלד הודעה ל${view.profile.name}..." />
          <button type="button" id="sendBtn">שלח</button>
        </div>`;

      const container = document.getElementById('messagesContainer');
      container.scrollTop = container.scrollHeight;

      const send = async () => {
        const input = document.getElementById('messageInput');
        if (!input.value.trim()) return;
        try {
          await api('/api/console/' + selectedAthlete + '/send', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ content: input.value })
          });
          input.value = '';
          refreshThread();
          loadAthletes();
        } catch (err) { alert(err.message); }
      };

      document.getElementById('sendBtn').addEventListener('click', send);
      document.getElementById('messageInput').addEventListener('keypress', (event) => {
        if (event.key === 'Enter') { event.preventDefault(); send(); }
      });
      area.querySelectorAll('[data-template]').forEach((btn) => {
        btn.addEventListener('click', () => {
          const input = document.getElementById('messageInput');
          input.value = btn.textContent;
          input.focus();
        });
      });
    };

    const refreshThread = async () => {
      if (!selectedAthlete) return;
      try {
        const view = await api('/api/console/' + selectedAthlete + '/messages');
        const container = document.getElementById('messagesContainer');
        if (!container) return;
        container.innerHTML = view.messages.map(messageHtml).join('');
        container.scrollTop = container.scrollHeight;
        document.getElementById('typingIndicator').textContent =
          view.typing ? view.profile.name + ' מקליד...' : '';
      } catch (err) { console.error(err); }
    };

    const openThread = async (athleteId) => {
      selectedAthlete = athleteId;
      const view = await api('/api/console/' + athleteId + '/messages');
      renderThread(view);
      loadAthletes();
      if (threadPoll) clearInterval(threadPoll);
      threadPoll = setInterval(refreshThread, 3000);
    };

    document.getElementById('messageFilter').addEventListener('change', loadAthletes);
    document.getElementById('statusSelector').addEventListener('change', async (event) => {
      await api('/api/console/status', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ status: event.target.value })
      });
    });

    loadAthletes();
    setInterval(loadAthletes, 60000);
  </script>
</body>
</html>
"#;
